//! ztrace - 轨道工作区数据模型库
//!
//! 模块结构：
//! - models: 数据模型（TrackTree, Workspace, Snapshot）
//! - kernel: 状态容器（WorkspaceManager）

pub mod kernel;
pub mod models;
