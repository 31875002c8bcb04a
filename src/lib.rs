//! Regionkit - selections, undoable bulk edits and blueprints for voxel worlds

pub mod core;
pub mod math;
pub mod geometry;
pub mod voxel;
pub mod edit;
pub mod session;
pub mod blueprint;

pub use crate::core::{EditConfig, Error, ErrorKind, PreconditionError, Result};
pub use crate::edit::{Command, EditOp, EditOutcome};
pub use crate::session::{Session, SessionManager};
pub use crate::voxel::{BlockAccess, VoxelSnapshot};
