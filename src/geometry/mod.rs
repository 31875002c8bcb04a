//! Shape generators: pure mappings from a range and shape parameters to
//! an ordered, duplicate-free list of voxel positions.
//!
//! Nothing here looks at voxel contents. Protected positions are filtered
//! by the command layer.

pub mod cylinder;

pub use cylinder::CylinderSpec;

use glam::IVec3;

use crate::math::WorldRange;

/// Shape of a bulk edit
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Every voxel in the range
    Fill,
    /// The six boundary faces of the range
    Walls,
    /// A cylinder standing on the range's minimum corner
    Cylinder(CylinderSpec),
}

impl Shape {
    /// Target positions for this shape over `range`.
    ///
    /// `min_y` is the lowest allowed anchor height for anchored shapes.
    pub fn points(&self, range: &WorldRange, min_y: i32) -> Vec<IVec3> {
        match self {
            Shape::Fill => range.points().collect(),
            Shape::Walls => range.sides().collect(),
            Shape::Cylinder(spec) => spec.rasterize(range.min, min_y),
        }
    }
}
