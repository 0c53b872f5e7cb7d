//! Location-indexed layout map for a campus cluster view.
//!
//! The map assigns workspaces, personal machines, pillars, and empty slots
//! to 2-D grid coordinates and supports lookup and removal of a node by
//! coordinate or identity. Mutation is functional: every removal yields a
//! new map value, so renderers holding the previous snapshot never observe
//! a partially edited grid. The `session` module owns the live version for
//! a hosted view; `storage` holds unrelated browser-store key builders.

pub mod error;
pub mod geometry;
pub mod logging;
pub mod map;
pub mod metrics;
pub mod node;
pub mod session;
pub mod storage;

pub use error::{MapError, Result};
pub use geometry::{GridDims, MapLocation};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use map::{ClusterTableMap, CompactionPolicy, Extracted, Locator, MapBuilder};
pub use metrics::{MapMetrics, MetricSnapshot};
pub use node::{
    Cell, ClusterNode, NodeId, NodeKind, PersonalWorkspace, Pillar, UserPresence, Workspace,
    WorkspaceWithUser,
};
pub use session::{ClusterContainerProps, MapSession, SessionConfig};
