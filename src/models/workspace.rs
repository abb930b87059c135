//! 工作区数据模型

use compact_str::CompactString;

use super::track_node::{session_unique_id, NodeId, TrackNodeConfig, TrackTree};

/// Single change-notification slot: one callback, one consumer (the layer
/// that schedules redraws). Multi-cast belongs outside this model.
pub type ChangeCallback = Box<dyn FnMut(&Workspace)>;

/// 工作区：顶层容器，一棵主轨道树加一棵置顶影子树
///
/// Both roots live in one arena and are created expanded. The pinned tree
/// never holds originals, only lightweight shadow nodes correlated to
/// their sources by uri. All mutation funnels through the workspace so
/// the change callback fires after every mutating call.
pub struct Workspace {
    id: CompactString,
    pub title: CompactString,
    tree: TrackTree,
    tracks_root: NodeId,
    pinned_root: NodeId,
    on_change: Option<ChangeCallback>,
}

impl Workspace {
    pub fn new(title: impl Into<CompactString>) -> Self {
        let mut tree = TrackTree::new();
        let tracks_root = tree.create_node(TrackNodeConfig {
            collapsed: false,
            ..Default::default()
        });
        let pinned_root = tree.create_node(TrackNodeConfig {
            collapsed: false,
            ..Default::default()
        });
        Self {
            id: session_unique_id(),
            title: title.into(),
            tree,
            tracks_root,
            pinned_root,
            on_change: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read access to the underlying tree. Mutation goes through the
    /// workspace methods so the change callback fires.
    pub fn tree(&self) -> &TrackTree {
        &self.tree
    }

    pub fn tracks_root(&self) -> NodeId {
        self.tracks_root
    }

    pub fn pinned_root(&self) -> NodeId {
        self.pinned_root
    }

    /// Top-level tracks of the main tree, in display order.
    pub fn tracks(&self) -> &[NodeId] {
        self.tree.children(self.tracks_root)
    }

    /// Pinned shadow nodes, in pin order.
    pub fn pinned_tracks(&self) -> &[NodeId] {
        self.tree.children(self.pinned_root)
    }

    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    // Take-call-restore: the callback observes a consistent workspace and
    // cannot re-enter mutation through the empty slot.
    fn notify(&mut self) {
        if let Some(mut callback) = self.on_change.take() {
            callback(self);
            self.on_change = Some(callback);
        }
    }

    /// Create a detached node in this workspace's tree. Creation alone
    /// changes neither tree, so no notification fires.
    pub fn create_node(&mut self, config: TrackNodeConfig) -> NodeId {
        self.tree.create_node(config)
    }

    // Node-scoped mutators. Each fires the change callback, no-op or not.

    pub fn add_child_last(&mut self, parent: NodeId, child: NodeId) {
        self.tree.add_child_last(parent, child);
        self.notify();
    }

    pub fn add_child_first(&mut self, parent: NodeId, child: NodeId) {
        self.tree.add_child_first(parent, child);
        self.notify();
    }

    pub fn add_child_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.tree.add_child_before(parent, child, reference);
        self.notify();
    }

    pub fn add_child_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.tree.add_child_after(parent, child, reference);
        self.notify();
    }

    pub fn add_child_in_order(&mut self, parent: NodeId, child: NodeId) {
        self.tree.add_child_in_order(parent, child);
        self.notify();
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let removed = self.tree.remove_child(parent, child);
        self.notify();
        removed
    }

    /// Detach `node` from its parent and drop its pinned shadow, if any.
    /// A no-op when the node is neither attached nor pinned.
    pub fn remove(&mut self, node: NodeId) {
        self.tree.detach(node);
        if let Some(shadow) = self.pinned_shadow_of(node) {
            if shadow != node {
                self.tree.destroy(shadow);
            }
        }
        self.notify();
    }

    /// Detach `node`, drop its pinned shadow and reclaim the whole
    /// subtree's slots.
    pub fn destroy(&mut self, node: NodeId) {
        assert!(
            node != self.tracks_root && node != self.pinned_root,
            "cannot destroy a workspace root"
        );
        if let Some(shadow) = self.pinned_shadow_of(node) {
            if shadow != node {
                self.tree.destroy(shadow);
            }
        }
        self.tree.destroy(node);
        self.notify();
    }

    /// Drop all tracks and all pinned shadows.
    pub fn clear(&mut self) {
        for child in self.tree.children(self.tracks_root).to_vec() {
            self.tree.destroy(child);
        }
        for child in self.tree.children(self.pinned_root).to_vec() {
            self.tree.destroy(child);
        }
        self.notify();
    }

    // Ordered-insertion API of the main tree: the node-scoped operations
    // with the main root as implicit parent.

    pub fn add_track_last(&mut self, child: NodeId) {
        self.add_child_last(self.tracks_root, child);
    }

    pub fn add_track_first(&mut self, child: NodeId) {
        self.add_child_first(self.tracks_root, child);
    }

    pub fn add_track_before(&mut self, child: NodeId, reference: NodeId) {
        self.add_child_before(self.tracks_root, child, reference);
    }

    pub fn add_track_after(&mut self, child: NodeId, reference: NodeId) {
        self.add_child_after(self.tracks_root, child, reference);
    }

    pub fn add_track_in_order(&mut self, child: NodeId) {
        self.add_child_in_order(self.tracks_root, child);
    }

    pub fn remove_track(&mut self, child: NodeId) -> bool {
        self.remove_child(self.tracks_root, child)
    }

    /// Pin a lightweight shadow of `node`: only uri, title and removable
    /// carry over. The shadow has a fresh id, no children, and shares no
    /// mutable state with its source.
    pub fn pin_track(&mut self, node: NodeId) {
        let config = {
            let source = self.tree.node(node).expect("no such track node");
            TrackNodeConfig {
                uri: source.uri().map(CompactString::from),
                title: CompactString::from(source.title()),
                removable: source.removable(),
                ..Default::default()
            }
        };
        let shadow = self.tree.create_node(config);
        self.tree.add_child_last(self.pinned_root, shadow);
        self.notify();
    }

    /// Drop the pinned shadow correlated to `node`. Correlation is by
    /// uri, the only key tying a tree node to its shadow; a no-op when
    /// nothing matching is pinned.
    pub fn unpin_track(&mut self, node: NodeId) {
        if let Some(shadow) = self.pinned_shadow_of(node) {
            self.tree.destroy(shadow);
        }
        self.notify();
    }

    /// Whether a shadow of `node` is currently pinned.
    pub fn has_pinned_track(&self, node: NodeId) -> bool {
        self.pinned_shadow_of(node).is_some()
    }

    /// Id lookup over the main tree first, then the pinned shadows. A
    /// source node's id is never found on the pinned side: shadows carry
    /// their own fresh ids.
    pub fn get_track_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .get_track_by_id(self.tracks_root, id)
            .or_else(|| self.tree.get_track_by_id(self.pinned_root, id))
    }

    /// Uri lookup scoped to the main tree only; pinned shadows never
    /// resolve here. Linear scan of the flattened tracks.
    pub fn find_track_by_uri(&self, uri: &str) -> Option<NodeId> {
        self.tree
            .flat_tracks(self.tracks_root)
            .into_iter()
            .find(|&node| self.tree.node(node).and_then(|n| n.uri()) == Some(uri))
    }

    /// Depth-first pre-order flattening of the main tree.
    pub fn flat_tracks_ordered(&self) -> Vec<NodeId> {
        self.tree.flat_tracks_ordered(self.tracks_root)
    }

    /// Unordered flattening of the main tree.
    pub fn flat_tracks(&self) -> Vec<NodeId> {
        self.tree.flat_tracks(self.tracks_root)
    }

    // Fold state is tree state: the redraw consumer needs to hear about
    // it, so these notify like the structural mutators.

    pub fn expand(&mut self, node: NodeId) {
        self.tree.expand(node);
        self.notify();
    }

    pub fn collapse(&mut self, node: NodeId) {
        self.tree.collapse(node);
        self.notify();
    }

    pub fn toggle_collapsed(&mut self, node: NodeId) {
        self.tree.toggle_collapsed(node);
        self.notify();
    }

    pub fn reveal(&mut self, node: NodeId) {
        self.tree.reveal(node);
        self.notify();
    }

    /// Titles are plain display data; no change notification fires.
    pub fn set_node_title(&mut self, node: NodeId, title: impl Into<CompactString>) {
        self.tree.set_title(node, title);
    }

    fn pinned_shadow_of(&self, node: NodeId) -> Option<NodeId> {
        let source = self.tree.node(node)?;
        let uri = source.uri();
        self.tree
            .children(self.pinned_root)
            .iter()
            .copied()
            .find(|&shadow| self.tree.node(shadow).and_then(|n| n.uri()) == uri)
    }
}
