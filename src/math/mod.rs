//! Integer spatial primitives: ranges, selections and directions

pub mod range;
pub mod direction;

pub use range::{Selection, WorldRange};
pub use direction::{Direction, DirectionAmount};
