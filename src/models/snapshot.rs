//! Serde snapshots of a workspace layout.
//!
//! Snapshots capture structure and display state only. Node ids are
//! session-unique and deliberately absent from the wire format; a restore
//! mints fresh ones.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::track_node::{NodeId, TrackNodeConfig, TrackTree};
use super::workspace::Workspace;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    UnsupportedVersion(u32),
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::UnsupportedVersion(version) => {
                write!(f, "unsupported snapshot version {version}")
            }
            SnapshotError::Parse(err) => write!(f, "malformed snapshot: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Parse(err) => Some(err),
            SnapshotError::UnsupportedVersion(_) => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Parse(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackNodeSnapshot {
    #[serde(default)]
    pub uri: Option<CompactString>,
    #[serde(default)]
    pub title: CompactString,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub is_summary: bool,
    #[serde(default)]
    pub removable: bool,
    #[serde(default = "default_collapsed")]
    pub collapsed: bool,
    #[serde(default)]
    pub children: Vec<TrackNodeSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub title: CompactString,
    #[serde(default)]
    pub tracks: Vec<TrackNodeSnapshot>,
    #[serde(default)]
    pub pinned: Vec<TrackNodeSnapshot>,
}

fn default_collapsed() -> bool {
    true
}

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

impl WorkspaceSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Parse)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: WorkspaceSnapshot = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

impl Workspace {
    /// Capture this workspace's structure and display state.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            version: SNAPSHOT_VERSION,
            title: self.title.clone(),
            tracks: snapshot_children(self.tree(), self.tracks_root()),
            pinned: snapshot_children(self.tree(), self.pinned_root()),
        }
    }

    /// Rebuild a workspace from a snapshot. Restore is total: every node
    /// gets a fresh session-unique id, and pinned shadows are standalone,
    /// so nothing here can dangle.
    pub fn from_snapshot(snapshot: &WorkspaceSnapshot) -> Workspace {
        let mut workspace = Workspace::new(snapshot.title.clone());
        let tracks_root = workspace.tracks_root();
        let pinned_root = workspace.pinned_root();
        restore_children(&mut workspace, tracks_root, &snapshot.tracks);
        restore_children(&mut workspace, pinned_root, &snapshot.pinned);
        workspace
    }
}

fn snapshot_children(tree: &TrackTree, parent: NodeId) -> Vec<TrackNodeSnapshot> {
    tree.children(parent)
        .iter()
        .filter_map(|&child| {
            tree.node(child).map(|n| TrackNodeSnapshot {
                uri: n.uri().map(CompactString::from),
                title: CompactString::from(n.title()),
                sort_order: n.sort_order(),
                headless: n.headless(),
                is_summary: n.is_summary(),
                removable: n.removable(),
                collapsed: n.is_collapsed(),
                children: snapshot_children(tree, child),
            })
        })
        .collect()
}

fn restore_children(workspace: &mut Workspace, parent: NodeId, snapshots: &[TrackNodeSnapshot]) {
    for snapshot in snapshots {
        let node = workspace.create_node(TrackNodeConfig {
            id: None,
            uri: snapshot.uri.clone(),
            title: snapshot.title.clone(),
            sort_order: snapshot.sort_order,
            headless: snapshot.headless,
            is_summary: snapshot.is_summary,
            removable: snapshot.removable,
            collapsed: snapshot.collapsed,
        });
        workspace.add_child_last(parent, node);
        restore_children(workspace, node, &snapshot.children);
    }
}
