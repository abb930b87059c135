//! Workspace registry: one workspace per loaded trace session plus any
//! ad-hoc extras the user creates, with a current-workspace pointer.

use compact_str::CompactString;
use tracing::debug;

use crate::models::Workspace;

pub const DEFAULT_WORKSPACE_TITLE: &str = "Default Workspace";

/// Ordered registry of workspaces. There is always at least one; the
/// default workspace cannot be discarded away.
pub struct WorkspaceManager {
    workspaces: Vec<Workspace>,
    current: usize,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        let mut manager = Self {
            workspaces: Vec::new(),
            current: 0,
        };
        manager.push_workspace(Workspace::new(DEFAULT_WORKSPACE_TITLE));
        manager
    }

    pub fn current(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.current]
    }

    /// All workspaces in creation order.
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace(&self, id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id() == id)
    }

    pub fn workspace_mut(&mut self, id: &str) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|w| w.id() == id)
    }

    /// Create a new empty workspace and return its id. Does not switch to
    /// it.
    pub fn create_empty_workspace(&mut self, title: impl Into<CompactString>) -> CompactString {
        self.push_workspace(Workspace::new(title))
    }

    /// Clone a workspace's layout into a new one with fresh node ids.
    /// Returns the new id, or `None` for an unknown source.
    pub fn clone_workspace(&mut self, id: &str) -> Option<CompactString> {
        let source = self.workspace(id)?;
        let mut copy = Workspace::from_snapshot(&source.snapshot());
        copy.title = CompactString::from(format!("Copy of {}", source.title));
        let source_id = CompactString::from(id);
        let copy_id = self.push_workspace(copy);
        debug!(source = %source_id, copy = %copy_id, "cloned workspace");
        Some(copy_id)
    }

    /// Make the workspace with `id` current. Returns false for an unknown
    /// id.
    pub fn switch_workspace(&mut self, id: &str) -> bool {
        match self.workspaces.iter().position(|w| w.id() == id) {
            Some(index) => {
                self.current = index;
                debug!(workspace = %id, "switched workspace");
                true
            }
            None => false,
        }
    }

    /// Drop the workspace with `id`. The last remaining workspace is kept
    /// no matter what; discarding the current one falls back to the first
    /// remaining. Returns false when nothing was discarded.
    pub fn discard_workspace(&mut self, id: &str) -> bool {
        if self.workspaces.len() <= 1 {
            return false;
        }
        let index = match self.workspaces.iter().position(|w| w.id() == id) {
            Some(index) => index,
            None => return false,
        };
        self.workspaces.remove(index);
        if self.current == index {
            self.current = 0;
        } else if self.current > index {
            self.current -= 1;
        }
        debug!(workspace = %id, "discarded workspace");
        true
    }

    fn push_workspace(&mut self, workspace: Workspace) -> CompactString {
        let id = CompactString::from(workspace.id());
        debug!(workspace = %id, title = %workspace.title, "created workspace");
        self.workspaces.push(workspace);
        id
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}
