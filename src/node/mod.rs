//! Node module orchestrator following the RSB module specification.
//!
//! Downstream code imports the cell variants from here while the
//! implementation details live in the private `core` module.

mod core;

pub use core::{
    Cell, ClusterNode, NodeId, NodeKind, PersonalWorkspace, Pillar, UserPresence, Workspace,
    WorkspaceWithUser,
};
