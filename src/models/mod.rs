//! 数据模型层

pub mod snapshot;
pub mod track_node;
pub mod workspace;

pub use snapshot::{SnapshotError, TrackNodeSnapshot, WorkspaceSnapshot, SNAPSHOT_VERSION};
pub use track_node::{session_unique_id, NodeId, TrackNode, TrackNodeConfig, TrackTree};
pub use workspace::{ChangeCallback, Workspace};
