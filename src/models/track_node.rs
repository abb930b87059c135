//! 轨道树数据模型

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! { pub struct NodeId; }

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short session-unique id: a lowercase base-36 counter, monotonically
/// increasing for the lifetime of the process.
pub fn session_unique_id() -> CompactString {
    let mut n = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    let mut digits = [0u8; 13];
    let mut len = 0;
    loop {
        digits[len] = BASE36_DIGITS[(n % 36) as usize];
        len += 1;
        n /= 36;
        if n == 0 {
            break;
        }
    }
    let mut id = CompactString::default();
    for &digit in digits[..len].iter().rev() {
        id.push(digit as char);
    }
    id
}

/// Construction options for a track node.
#[derive(Debug, Clone)]
pub struct TrackNodeConfig {
    /// Session-unique id; generated when `None`. Immutable once created.
    pub id: Option<CompactString>,
    /// Opaque key an external track registry resolves to renderable
    /// content. Not validated or dereferenced here.
    pub uri: Option<CompactString>,
    pub title: CompactString,
    /// Hint for order-preserving insertion; missing sorts as 0.
    pub sort_order: Option<i32>,
    /// Hide this node's own header and show only its children.
    pub headless: bool,
    /// The node is a collapsed preview of its children.
    pub is_summary: bool,
    /// Whether user-facing UI should offer a delete affordance.
    pub removable: bool,
    pub collapsed: bool,
}

impl Default for TrackNodeConfig {
    fn default() -> Self {
        Self {
            id: None,
            uri: None,
            title: CompactString::default(),
            sort_order: None,
            headless: false,
            is_summary: false,
            removable: false,
            collapsed: true,
        }
    }
}

/// A node in a track tree: an ordered list of children plus two derived
/// indexes covering the whole subtree below it (id → node, uri → node).
#[derive(Debug)]
pub struct TrackNode {
    id: CompactString,
    uri: Option<CompactString>,
    title: CompactString,
    sort_order: Option<i32>,
    headless: bool,
    is_summary: bool,
    removable: bool,
    collapsed: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    ids: FxHashMap<CompactString, NodeId>,
    uris: FxHashMap<CompactString, NodeId>,
}

impl TrackNode {
    fn from_config(config: TrackNodeConfig) -> Self {
        Self {
            id: config.id.unwrap_or_else(session_unique_id),
            uri: config.uri,
            title: config.title,
            sort_order: config.sort_order,
            headless: config.headless,
            is_summary: config.is_summary,
            removable: config.removable,
            collapsed: config.collapsed,
            parent: None,
            children: Vec::new(),
            ids: FxHashMap::default(),
            uris: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn is_summary(&self) -> bool {
        self.is_summary
    }

    pub fn removable(&self) -> bool {
        self.removable
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in display order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn rank(&self) -> i32 {
        self.sort_order.unwrap_or(0)
    }
}

/// Arena of track nodes. Node handles are slotmap keys; the parent link is
/// a plain key, so ownership only ever flows parent → child.
///
/// Every structural mutation keeps the per-node subtree indexes consistent
/// by merging or scrubbing the moved subtree's entries in every transitive
/// ancestor, which is what makes `get_track_by_id`/`find_track_by_uri`
/// O(1) from any scope.
pub struct TrackTree {
    arena: SlotMap<NodeId, TrackNode>,
}

impl TrackTree {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
        }
    }

    /// Create a detached node.
    pub fn create_node(&mut self, config: TrackNodeConfig) -> NodeId {
        self.arena.insert(TrackNode::from_config(config))
    }

    pub fn node(&self, id: NodeId) -> Option<&TrackNode> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    /// Direct children of `node` in display order; empty for unknown ids.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.arena
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_title(&mut self, node: NodeId, title: impl Into<CompactString>) {
        if let Some(n) = self.arena.get_mut(node) {
            n.title = title.into();
        }
    }

    /// Whether `ancestor` lies on `descendant`'s parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut cursor = self.arena.get(descendant).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.arena.get(current).and_then(|n| n.parent);
        }
        false
    }

    /// Attach `child` as the last child of `parent`. A child that is
    /// already attached elsewhere is detached from its old parent first.
    pub fn add_child_last(&mut self, parent: NodeId, child: NodeId) {
        if !self.begin_attach(parent, child) {
            return;
        }
        self.arena[parent].children.push(child);
        self.finish_attach(parent, child);
    }

    /// Attach `child` as the first child of `parent`.
    pub fn add_child_first(&mut self, parent: NodeId, child: NodeId) {
        if !self.begin_attach(parent, child) {
            return;
        }
        self.arena[parent].children.insert(0, child);
        self.finish_attach(parent, child);
    }

    /// Insert `child` immediately before `reference`.
    ///
    /// `reference` must already be a child of `parent`; violating that is
    /// a caller bug and panics. `child == reference` is a no-op.
    pub fn add_child_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if child == reference {
            return;
        }
        if !self.begin_attach(parent, child) {
            return;
        }
        let pos = self.child_position(parent, reference);
        self.arena[parent].children.insert(pos, child);
        self.finish_attach(parent, child);
    }

    /// Insert `child` immediately after `reference`.
    ///
    /// Same preconditions as [`TrackTree::add_child_before`].
    pub fn add_child_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if child == reference {
            return;
        }
        if !self.begin_attach(parent, child) {
            return;
        }
        let pos = self.child_position(parent, reference);
        self.arena[parent].children.insert(pos + 1, child);
        self.finish_attach(parent, child);
    }

    /// Insertion sort by `sort_order` (missing sorts as 0): the new child
    /// lands before the first existing child with a strictly greater sort
    /// order, i.e. after all existing equal-or-lower values.
    pub fn add_child_in_order(&mut self, parent: NodeId, child: NodeId) {
        if !self.begin_attach(parent, child) {
            return;
        }
        let rank = self.arena[child].rank();
        let children = &self.arena[parent].children;
        let pos = children
            .iter()
            .position(|&c| self.arena[c].rank() > rank)
            .unwrap_or(children.len());
        self.arena[parent].children.insert(pos, child);
        self.finish_attach(parent, child);
    }

    /// Detach `child` from `parent`. Not an error if `child` is not a
    /// direct child of `parent`; the call is simply a no-op then.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.arena.get(child).and_then(|n| n.parent) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Detach `node` from its parent, if attached. The subtree stays
    /// resident and can be re-attached anywhere.
    pub fn detach(&mut self, node: NodeId) {
        let parent = match self.arena[node].parent {
            Some(parent) => parent,
            None => return,
        };
        self.propagate_removal(parent, node);
        let siblings = &mut self.arena[parent].children;
        if let Some(pos) = siblings.iter().position(|&c| c == node) {
            siblings.remove(pos);
        }
        self.arena[node].parent = None;
    }

    /// Detach `node` and reclaim its whole subtree's slots. The terminal
    /// form of removal: the handles become invalid.
    pub fn destroy(&mut self, node: NodeId) {
        self.detach(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(n) = self.arena.remove(current) {
                stack.extend(n.children);
            }
        }
    }

    /// Structurally independent copy of `node` with a freshly generated
    /// id; `deep` clones all descendants, each with a fresh id of its
    /// own. The copy starts detached.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId {
        let config = {
            let n = &self.arena[node];
            TrackNodeConfig {
                id: None,
                uri: n.uri.clone(),
                title: n.title.clone(),
                sort_order: n.sort_order,
                headless: n.headless,
                is_summary: n.is_summary,
                removable: n.removable,
                collapsed: n.collapsed,
            }
        };
        let copy = self.create_node(config);
        if deep {
            let children = self.arena[node].children.clone();
            for child in children {
                let child_copy = self.clone_node(child, true);
                self.add_child_last(copy, child_copy);
            }
        }
        copy
    }

    /// O(1) id lookup within the subtree rooted at `scope`, `scope`
    /// itself included.
    pub fn get_track_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        let node = self.arena.get(scope)?;
        if node.id.as_str() == id {
            return Some(scope);
        }
        node.ids.get(id).copied()
    }

    /// O(1) uri lookup within the subtree rooted at `scope`. When several
    /// nodes carry the same uri, the most recently indexed one wins.
    pub fn find_track_by_uri(&self, scope: NodeId, uri: &str) -> Option<NodeId> {
        let node = self.arena.get(scope)?;
        if node.uri.as_deref() == Some(uri) {
            return Some(scope);
        }
        node.uris.get(uri).copied()
    }

    /// Depth-first, parent-before-children, children in display order.
    /// `scope` itself is not included. Recomputed per call; the tree may
    /// mutate between calls.
    pub fn flat_tracks_ordered(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let node = match self.arena.get(scope) {
            Some(node) => node,
            None => return out,
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.arena[current].children.iter().rev());
        }
        out
    }

    /// Unordered flattening straight off the subtree index; cheaper than
    /// the ordered walk for callers that do not care about display order.
    pub fn flat_tracks(&self, scope: NodeId) -> Vec<NodeId> {
        self.arena
            .get(scope)
            .map(|n| n.ids.values().copied().collect())
            .unwrap_or_default()
    }

    /// The first collapsed node on the path root → `node`, or `node`
    /// itself when every ancestor is expanded: the nearest node the user
    /// can actually see given the current fold state.
    pub fn find_closest_visible_ancestor(&self, node: NodeId) -> NodeId {
        let mut path = Vec::new();
        let mut cursor = self.arena.get(node).and_then(|n| n.parent);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.arena.get(current).and_then(|n| n.parent);
        }
        for &ancestor in path.iter().rev() {
            if self.arena[ancestor].collapsed {
                return ancestor;
            }
        }
        node
    }

    /// Expand every ancestor between `node` and the tree root, the root
    /// itself excluded. Idempotent.
    pub fn reveal(&mut self, node: NodeId) {
        let mut cursor = self.arena.get(node).and_then(|n| n.parent);
        while let Some(current) = cursor {
            let next = self.arena[current].parent;
            if next.is_some() {
                self.arena[current].collapsed = false;
            }
            cursor = next;
        }
    }

    pub fn expand(&mut self, node: NodeId) {
        if let Some(n) = self.arena.get_mut(node) {
            n.collapsed = false;
        }
    }

    pub fn collapse(&mut self, node: NodeId) {
        if let Some(n) = self.arena.get_mut(node) {
            n.collapsed = true;
        }
    }

    pub fn toggle_collapsed(&mut self, node: NodeId) {
        if let Some(n) = self.arena.get_mut(node) {
            n.collapsed = !n.collapsed;
        }
    }

    /// Title path from the tree root down to `node`, root excluded,
    /// `node`'s own title last.
    pub fn full_path(&self, node: NodeId) -> Vec<CompactString> {
        let mut titles = Vec::new();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let n = &self.arena[current];
            if n.parent.is_some() {
                titles.push(n.title.clone());
            }
            cursor = n.parent;
        }
        titles.reverse();
        titles
    }

    /// Root of whatever tree `node` is currently attached to; `node`
    /// itself when detached.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.arena.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    // Shared attach prologue: identity and cycle guards, then detach from
    // any old parent with full index cleanup on the old ancestor chain.
    // Returns false when the attach is a guarded no-op.
    fn begin_attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child {
            return false;
        }
        assert!(
            !self.is_ancestor(child, parent),
            "cannot attach a node beneath its own descendant"
        );
        self.detach(child);
        true
    }

    fn finish_attach(&mut self, parent: NodeId, child: NodeId) {
        self.arena[child].parent = Some(parent);
        self.propagate_addition(parent, child);
    }

    fn child_position(&self, parent: NodeId, reference: NodeId) -> usize {
        self.arena[parent]
            .children
            .iter()
            .position(|&c| c == reference)
            .expect("reference node is not a child of this node")
    }

    // The id/uri entries `node` contributes to ancestor indexes: the node
    // itself plus its whole subtree, read off its own index.
    fn index_entries(
        &self,
        node: NodeId,
    ) -> (Vec<(CompactString, NodeId)>, Vec<(CompactString, NodeId)>) {
        let n = &self.arena[node];
        let mut ids = Vec::with_capacity(n.ids.len() + 1);
        ids.push((n.id.clone(), node));
        ids.extend(n.ids.iter().map(|(k, v)| (k.clone(), *v)));
        let mut uris = Vec::with_capacity(n.uris.len() + 1);
        if let Some(uri) = &n.uri {
            uris.push((uri.clone(), node));
        }
        uris.extend(n.uris.iter().map(|(k, v)| (k.clone(), *v)));
        (ids, uris)
    }

    // Merge `node`'s subtree entries into every index from `start` up to
    // the root of that tree.
    fn propagate_addition(&mut self, start: NodeId, node: NodeId) {
        let (ids, uris) = self.index_entries(node);
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            let ancestor = &mut self.arena[current];
            for (id, target) in &ids {
                ancestor.ids.insert(id.clone(), *target);
            }
            for (uri, target) in &uris {
                ancestor.uris.insert(uri.clone(), *target);
            }
            cursor = ancestor.parent;
        }
    }

    // Symmetric removal. An entry is dropped only while it still points
    // at the subtree being removed, so a colliding uri indexed later
    // survives the removal of an earlier loser.
    fn propagate_removal(&mut self, start: NodeId, node: NodeId) {
        let (ids, uris) = self.index_entries(node);
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            let ancestor = &mut self.arena[current];
            for (id, target) in &ids {
                if ancestor.ids.get(id.as_str()) == Some(target) {
                    ancestor.ids.remove(id.as_str());
                }
            }
            for (uri, target) in &uris {
                if ancestor.uris.get(uri.as_str()) == Some(target) {
                    ancestor.uris.remove(uri.as_str());
                }
            }
            cursor = ancestor.parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tree: &mut TrackTree, title: &str) -> NodeId {
        tree.create_node(TrackNodeConfig {
            title: title.into(),
            ..Default::default()
        })
    }

    fn uri_node(tree: &mut TrackTree, title: &str, uri: &str) -> NodeId {
        tree.create_node(TrackNodeConfig {
            title: title.into(),
            uri: Some(uri.into()),
            ..Default::default()
        })
    }

    fn ranked_node(tree: &mut TrackTree, title: &str, sort_order: i32) -> NodeId {
        tree.create_node(TrackNodeConfig {
            title: title.into(),
            sort_order: Some(sort_order),
            ..Default::default()
        })
    }

    fn titles(tree: &TrackTree, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| tree.node(n).unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn test_session_unique_ids_are_distinct() {
        let mut tree = TrackTree::new();
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        assert_ne!(tree.node(a).unwrap().id(), tree.node(b).unwrap().id());
        assert!(!tree.node(a).unwrap().id().is_empty());
    }

    #[test]
    fn test_explicit_id_is_kept() {
        let mut tree = TrackTree::new();
        let a = tree.create_node(TrackNodeConfig {
            id: Some("custom".into()),
            ..Default::default()
        });
        assert_eq!(tree.node(a).unwrap().id(), "custom");
    }

    #[test]
    fn test_add_child_last_and_first() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");

        tree.add_child_last(root, a);
        tree.add_child_last(root, b);
        tree.add_child_first(root, c);

        assert_eq!(titles(&tree, tree.children(root)), ["c", "a", "b"]);
        assert_eq!(tree.node(a).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_add_child_before_and_after() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");
        let d = node(&mut tree, "d");

        tree.add_child_last(root, a);
        tree.add_child_last(root, b);
        tree.add_child_before(root, c, b);
        tree.add_child_after(root, d, a);

        assert_eq!(titles(&tree, tree.children(root)), ["a", "d", "c", "b"]);
    }

    #[test]
    fn test_add_child_before_self_reference_is_noop() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        tree.add_child_last(root, a);

        tree.add_child_before(root, a, a);
        tree.add_child_after(root, a, a);

        assert_eq!(tree.children(root), [a]);
    }

    #[test]
    #[should_panic(expected = "reference node is not a child")]
    fn test_add_child_before_foreign_reference_panics() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let other = node(&mut tree, "other");
        let orphan = node(&mut tree, "orphan");
        let child = node(&mut tree, "child");
        tree.add_child_last(other, orphan);

        tree.add_child_before(root, child, orphan);
    }

    #[test]
    fn test_add_child_in_order_sorts_and_is_stable() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let p = ranked_node(&mut tree, "p", 10);
        let q = ranked_node(&mut tree, "q", 5);
        let r1 = ranked_node(&mut tree, "r1", 5);
        let unranked = node(&mut tree, "unranked");

        tree.add_child_in_order(root, p);
        tree.add_child_in_order(root, q);
        tree.add_child_in_order(root, r1);
        // Missing sort order sorts as 0, ahead of everything ranked here.
        tree.add_child_in_order(root, unranked);

        assert_eq!(titles(&tree, tree.children(root)), ["unranked", "q", "r1", "p"]);
    }

    #[test]
    fn test_self_attach_is_noop() {
        let mut tree = TrackTree::new();
        let a = node(&mut tree, "a");
        tree.add_child_last(a, a);
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.node(a).unwrap().parent(), None);
    }

    #[test]
    #[should_panic(expected = "beneath its own descendant")]
    fn test_attach_beneath_descendant_panics() {
        let mut tree = TrackTree::new();
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");
        tree.add_child_last(a, b);
        tree.add_child_last(b, c);

        tree.add_child_last(c, a);
    }

    #[test]
    fn test_reparent_leaves_single_occurrence() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let p1 = node(&mut tree, "p1");
        let p2 = node(&mut tree, "p2");
        let child = uri_node(&mut tree, "child", "trk.child");
        tree.add_child_last(root, p1);
        tree.add_child_last(root, p2);
        tree.add_child_last(p1, child);

        tree.add_child_last(p2, child);

        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.children(p2), [child]);
        assert_eq!(tree.node(child).unwrap().parent(), Some(p2));
        // The old parent's index no longer knows the child; the root still
        // does via the new chain.
        let child_id = tree.node(child).unwrap().id().to_string();
        assert_eq!(tree.get_track_by_id(p1, &child_id), None);
        assert_eq!(tree.get_track_by_id(p2, &child_id), Some(child));
        assert_eq!(tree.get_track_by_id(root, &child_id), Some(child));
    }

    #[test]
    fn test_index_propagates_through_all_ancestors() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        tree.add_child_last(root, a);
        tree.add_child_last(a, b);

        // Graft a pre-built subtree and check every ancestor sees it.
        let sub = node(&mut tree, "sub");
        let leaf = uri_node(&mut tree, "leaf", "trk.leaf");
        tree.add_child_last(sub, leaf);
        tree.add_child_last(b, sub);

        let leaf_id = tree.node(leaf).unwrap().id().to_string();
        for scope in [b, a, root] {
            assert_eq!(tree.get_track_by_id(scope, &leaf_id), Some(leaf));
            assert_eq!(tree.find_track_by_uri(scope, "trk.leaf"), Some(leaf));
        }

        // Pruning the middle of the chain scrubs the whole subtree from
        // every ancestor index.
        tree.remove_child(a, b);
        for scope in [a, root] {
            assert_eq!(tree.get_track_by_id(scope, &leaf_id), None);
            assert_eq!(tree.find_track_by_uri(scope, "trk.leaf"), None);
        }
        assert_eq!(tree.get_track_by_id(b, &leaf_id), Some(leaf));
    }

    #[test]
    fn test_uri_collision_last_write_wins() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let first = uri_node(&mut tree, "first", "trk.dup");
        let second = uri_node(&mut tree, "second", "trk.dup");
        tree.add_child_last(root, first);
        tree.add_child_last(root, second);

        // Most recently indexed node wins the uri slot.
        assert_eq!(tree.find_track_by_uri(root, "trk.dup"), Some(second));

        // Removing the loser leaves the winner resolvable.
        tree.remove_child(root, first);
        assert_eq!(tree.find_track_by_uri(root, "trk.dup"), Some(second));

        // Re-attaching takes the uri slot back: last write wins again.
        tree.add_child_last(root, first);
        assert_eq!(tree.find_track_by_uri(root, "trk.dup"), Some(first));

        // Known, intentional ambiguity: removing the current winner leaves
        // the still-attached loser unindexed until a later attach
        // re-indexes it.
        tree.remove_child(root, first);
        assert_eq!(tree.find_track_by_uri(root, "trk.dup"), None);
        assert!(tree.children(root).contains(&second));
    }

    #[test]
    fn test_clone_shallow_is_childless_with_fresh_id() {
        let mut tree = TrackTree::new();
        let group = uri_node(&mut tree, "group", "trk.group");
        let child = node(&mut tree, "child");
        tree.add_child_last(group, child);

        let copy = tree.clone_node(group, false);

        assert_ne!(tree.node(copy).unwrap().id(), tree.node(group).unwrap().id());
        assert_eq!(tree.node(copy).unwrap().uri(), Some("trk.group"));
        assert_eq!(tree.node(copy).unwrap().title(), "group");
        assert!(tree.children(copy).is_empty());
        assert_eq!(tree.node(copy).unwrap().parent(), None);
    }

    #[test]
    fn test_clone_deep_reproduces_structure_independently() {
        let mut tree = TrackTree::new();
        let group = node(&mut tree, "group");
        let a = uri_node(&mut tree, "a", "trk.a");
        let b = uri_node(&mut tree, "b", "trk.b");
        tree.add_child_last(group, a);
        tree.add_child_last(group, b);

        let copy = tree.clone_node(group, true);

        let copy_children = tree.children(copy).to_vec();
        assert_eq!(titles(&tree, &copy_children), ["a", "b"]);
        for (&original, &cloned) in tree.children(group).to_vec().iter().zip(&copy_children) {
            assert_ne!(
                tree.node(original).unwrap().id(),
                tree.node(cloned).unwrap().id()
            );
            assert_eq!(
                tree.node(original).unwrap().uri(),
                tree.node(cloned).unwrap().uri()
            );
        }

        // Mutating the clone leaves the original subtree alone.
        let extra = node(&mut tree, "extra");
        tree.add_child_last(copy, extra);
        tree.set_title(copy_children[0], "renamed");
        assert_eq!(tree.children(group).len(), 2);
        assert_eq!(tree.node(a).unwrap().title(), "a");
    }

    #[test]
    fn test_remove_child_of_other_parent_is_noop() {
        let mut tree = TrackTree::new();
        let p1 = node(&mut tree, "p1");
        let p2 = node(&mut tree, "p2");
        let child = node(&mut tree, "child");
        tree.add_child_last(p1, child);

        assert!(!tree.remove_child(p2, child));
        assert_eq!(tree.children(p1), [child]);
        assert!(tree.remove_child(p1, child));
        // Double removal stays benign.
        assert!(!tree.remove_child(p1, child));
    }

    #[test]
    fn test_detach_then_reattach() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let group = node(&mut tree, "group");
        let leaf = uri_node(&mut tree, "leaf", "trk.leaf");
        tree.add_child_last(root, group);
        tree.add_child_last(group, leaf);

        tree.detach(group);
        assert_eq!(tree.node(group).unwrap().parent(), None);
        assert_eq!(tree.find_track_by_uri(root, "trk.leaf"), None);
        // Detached subtree keeps its own index intact.
        assert_eq!(tree.find_track_by_uri(group, "trk.leaf"), Some(leaf));

        tree.add_child_last(root, group);
        assert_eq!(tree.find_track_by_uri(root, "trk.leaf"), Some(leaf));
    }

    #[test]
    fn test_destroy_reclaims_subtree() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let group = node(&mut tree, "group");
        let leaf = uri_node(&mut tree, "leaf", "trk.leaf");
        tree.add_child_last(root, group);
        tree.add_child_last(group, leaf);
        let leaf_id = tree.node(leaf).unwrap().id().to_string();

        tree.destroy(group);

        assert!(!tree.contains(group));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.get_track_by_id(root, &leaf_id), None);
        assert_eq!(tree.find_track_by_uri(root, "trk.leaf"), None);
    }

    #[test]
    fn test_flat_tracks_ordered_is_depth_first() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let a1 = node(&mut tree, "a1");
        let a2 = node(&mut tree, "a2");
        tree.add_child_last(root, a);
        tree.add_child_last(root, b);
        tree.add_child_last(a, a1);
        tree.add_child_last(a, a2);

        let flat = tree.flat_tracks_ordered(root);
        assert_eq!(titles(&tree, &flat), ["a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_flat_tracks_matches_reachable_set() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");
        tree.add_child_last(root, a);
        tree.add_child_last(a, b);
        tree.add_child_last(b, c);

        let mut flat = tree.flat_tracks(root);
        let mut ordered = tree.flat_tracks_ordered(root);
        flat.sort();
        ordered.sort();
        assert_eq!(flat, ordered);
    }

    #[test]
    fn test_closest_visible_ancestor() {
        let mut tree = TrackTree::new();
        let root = tree.create_node(TrackNodeConfig {
            collapsed: false,
            ..Default::default()
        });
        let a = node(&mut tree, "a"); // collapsed by default
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");
        tree.add_child_last(root, a);
        tree.add_child_last(a, b);
        tree.add_child_last(b, c);
        tree.expand(b);

        // A collapsed ancestor nearest the root is the visible anchor.
        assert_eq!(tree.find_closest_visible_ancestor(c), a);

        tree.expand(a);
        assert_eq!(tree.find_closest_visible_ancestor(c), c);
    }

    #[test]
    fn test_reveal_expands_ancestors_but_not_root() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root"); // collapsed by default
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        let c = node(&mut tree, "c");
        tree.add_child_last(root, a);
        tree.add_child_last(a, b);
        tree.add_child_last(b, c);

        tree.reveal(c);

        assert!(!tree.node(a).unwrap().is_collapsed());
        assert!(!tree.node(b).unwrap().is_collapsed());
        // The root's own fold state is not touched.
        assert!(tree.node(root).unwrap().is_collapsed());
        // c itself keeps its state.
        assert!(tree.node(c).unwrap().is_collapsed());

        // Idempotent.
        tree.reveal(c);
        assert!(!tree.node(b).unwrap().is_collapsed());
    }

    #[test]
    fn test_full_path() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let group = node(&mut tree, "group");
        let leaf = node(&mut tree, "leaf");
        tree.add_child_last(root, group);
        tree.add_child_last(group, leaf);

        let path: Vec<String> = tree
            .full_path(leaf)
            .into_iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(path, ["group", "leaf"]);
        assert!(tree.full_path(root).is_empty());
    }

    #[test]
    fn test_root_of() {
        let mut tree = TrackTree::new();
        let root = node(&mut tree, "root");
        let a = node(&mut tree, "a");
        let b = node(&mut tree, "b");
        tree.add_child_last(root, a);
        tree.add_child_last(a, b);

        assert_eq!(tree.root_of(b), root);
        assert_eq!(tree.root_of(root), root);
    }
}
