//! Core type aliases and re-exports

pub use glam::{IVec3, Quat};

/// Integer voxel address. All voxel arithmetic is exact integer math.
pub type Coordinate = IVec3;

/// Identifies the user owning a session.
pub type UserId = u64;

/// Standard Result type for the engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
