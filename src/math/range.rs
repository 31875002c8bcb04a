//! Two-point selections and the normalized cuboid derived from them

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::core::error::PreconditionError;
use super::direction::Direction;

/// Inclusive integer cuboid with `min <= max` on every axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldRange {
    pub min: IVec3,
    pub max: IVec3,
}

impl WorldRange {
    /// Create a range spanning two arbitrary corners
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Range covering a single voxel
    pub fn from_point(p: IVec3) -> Self {
        Self { min: p, max: p }
    }

    /// Number of voxels along each axis
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    /// Total number of voxels
    pub fn volume(&self) -> u64 {
        let s = self.size().as_i64vec3();
        (s.x * s.y * s.z) as u64
    }

    /// Check if a voxel lies inside the range
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Grow the range so that it includes `p`
    pub fn extend_to_include(&mut self, p: IVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Copy of this range moved by `offset`
    pub fn translated(&self, offset: IVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Push the face pointing in `direction` outward by `amount`
    pub fn expand(&mut self, direction: Direction, amount: i32) {
        let step = direction.to_ivec3() * amount;
        if direction.is_positive() {
            self.max += step;
        } else {
            self.min += step;
        }
        *self = Self::new(self.min, self.max);
    }

    /// Pull the face pointing in `direction` inward by `amount`.
    /// The range never shrinks below one voxel thick.
    pub fn contract(&mut self, direction: Direction, amount: i32) {
        let axis = direction.axis_index();
        let room = self.max[axis] - self.min[axis];
        let amount = amount.clamp(0, room);
        if direction.is_positive() {
            self.max[axis] -= amount;
        } else {
            self.min[axis] += amount;
        }
    }

    /// Move the whole range by `amount` steps in `direction`
    pub fn shift(&mut self, direction: Direction, amount: i32) {
        *self = self.translated(direction.to_ivec3() * amount);
    }

    /// Every voxel in the range, x outer, y middle, z inner
    pub fn points(&self) -> impl Iterator<Item = IVec3> + use<> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    /// Voxels on the six boundary faces, in the same order as [`points`](Self::points)
    pub fn sides(&self) -> impl Iterator<Item = IVec3> + use<> {
        let range = *self;
        self.points().filter(move |p| range.on_boundary(*p))
    }

    fn on_boundary(&self, p: IVec3) -> bool {
        p.cmpeq(self.min).any() || p.cmpeq(self.max).any()
    }
}

/// A user's two selected corners; either may be unset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub first: Option<IVec3>,
    pub second: Option<IVec3>,
}

impl Selection {
    /// Selection with both corners set
    pub fn new(first: IVec3, second: IVec3) -> Self {
        Self {
            first: Some(first),
            second: Some(second),
        }
    }

    /// Both corners are present
    pub fn is_set(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    /// Normalized range, if both corners are set
    pub fn range(&self) -> Option<WorldRange> {
        match (self.first, self.second) {
            (Some(a), Some(b)) => Some(WorldRange::new(a, b)),
            _ => None,
        }
    }

    /// Normalized range, or `SelectionNotSet`
    pub fn require_range(&self) -> Result<WorldRange, PreconditionError> {
        self.range().ok_or(PreconditionError::SelectionNotSet)
    }

    /// Replace both corners with those of `range`
    pub fn set_range(&mut self, range: WorldRange) {
        self.first = Some(range.min);
        self.second = Some(range.max);
    }

    /// Forget both corners
    pub fn reset(&mut self) {
        self.first = None;
        self.second = None;
    }
}
