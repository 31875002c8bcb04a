//! Bulk edit operations and the writes they plan.
//!
//! An operation turns a range into an ordered list of `(position, new state)`
//! writes. Reading the world happens here; protection checks and the
//! actual writes happen in [`Command`](super::Command).

use std::sync::Arc;

use glam::IVec3;

use crate::blueprint::Blueprint;
use crate::core::error::PreconditionError;
use crate::geometry::{CylinderSpec, Shape};
use crate::math::{Direction, DirectionAmount, WorldRange};
use crate::voxel::{BlockAccess, BlockRegistry, PlantSnapshot, VoxelSnapshot};

/// A planned write
pub type PlannedWrite = (IVec3, VoxelSnapshot);

/// What a command does to its range
#[derive(Clone, Debug)]
pub enum EditOp {
    /// Write `state` at every point of `shape`
    Set { shape: Shape, state: VoxelSnapshot },
    /// Write `with` wherever the world currently holds `find`
    Replace { find: VoxelSnapshot, with: VoxelSnapshot },
    /// Bring every plant in the range to full growth
    Grow,
    /// Write a blueprint with its origin at `anchor`
    Paste { blueprint: Arc<Blueprint>, anchor: IVec3, skip_empty: bool },
    /// Move the range content by `offset`, leaving empty space behind
    Move { offset: IVec3 },
    /// Repeat the range content `count` times along `direction`
    Stack { direction: Direction, count: u32, gap: i32 },
}

impl EditOp {
    /// Fill the range with a named block
    pub fn set(registry: &BlockRegistry, name: &str) -> Result<Self, PreconditionError> {
        Ok(EditOp::Set { shape: Shape::Fill, state: registry.resolve(name)? })
    }

    /// Clear the range
    pub fn delete() -> Self {
        EditOp::Set { shape: Shape::Fill, state: VoxelSnapshot::Empty }
    }

    /// Cover the six faces of the range with a named block
    pub fn walls(registry: &BlockRegistry, name: &str) -> Result<Self, PreconditionError> {
        Ok(EditOp::Set { shape: Shape::Walls, state: registry.resolve(name)? })
    }

    /// Cylinder of a named block standing on the range's minimum corner
    pub fn cylinder(
        registry: &BlockRegistry,
        name: &str,
        radius_ns: i32,
        radius_we: i32,
        height: i32,
        filled: bool,
    ) -> Result<Self, PreconditionError> {
        let state = registry.resolve(name)?;
        let spec = CylinderSpec::new(radius_ns, radius_we, height, filled)?;
        Ok(EditOp::Set { shape: Shape::Cylinder(spec), state })
    }

    /// Replace one type with another; `with` of `None` clears
    pub fn replace(registry: &BlockRegistry, find: &str, with: Option<&str>) -> Result<Self, PreconditionError> {
        let find = registry.resolve(find)?;
        let with = match with.map(str::trim).filter(|w| !w.is_empty()) {
            Some(name) => registry.resolve(name)?,
            None => VoxelSnapshot::Empty,
        };
        Ok(EditOp::Replace { find, with })
    }

    /// Remove all water from the range
    pub fn drain(registry: &BlockRegistry) -> Result<Self, PreconditionError> {
        Self::replace(registry, "Water", None)
    }

    /// Paste a blueprint at `anchor`
    pub fn paste(blueprint: Arc<Blueprint>, anchor: IVec3, skip_empty: bool) -> Result<Self, PreconditionError> {
        if blueprint.is_empty() {
            return Err(PreconditionError::EmptyClipboard);
        }
        Ok(EditOp::Paste { blueprint, anchor, skip_empty })
    }

    /// Move the range content
    pub fn moved(step: DirectionAmount) -> Result<Self, PreconditionError> {
        if step.amount == 0 {
            return Err(PreconditionError::InvalidShape("move amount must be at least 1".into()));
        }
        Ok(EditOp::Move { offset: step.offset() })
    }

    /// Stack `step.amount` copies of the range, `gap` voxels apart
    pub fn stack(step: DirectionAmount, gap: i32) -> Result<Self, PreconditionError> {
        if step.amount == 0 {
            return Err(PreconditionError::InvalidShape("stack count must be at least 1".into()));
        }
        if gap < 0 {
            return Err(PreconditionError::InvalidShape("stack gap must not be negative".into()));
        }
        Ok(EditOp::Stack { direction: step.direction, count: step.amount as u32, gap })
    }

    /// Region a paste would cover, for operations that bring their own
    pub fn own_range(&self) -> Option<WorldRange> {
        match self {
            EditOp::Paste { blueprint, anchor, .. } => blueprint.extents().map(|r| r.translated(*anchor)),
            _ => None,
        }
    }

    /// Ordered writes for `range`
    pub fn plan(&self, range: &WorldRange, world: &dyn BlockAccess, min_y: i32) -> Vec<PlannedWrite> {
        match self {
            EditOp::Set { shape, state } => shape
                .points(range, min_y)
                .into_iter()
                .map(|p| (p, state.clone()))
                .collect(),
            EditOp::Replace { find, with } => range
                .points()
                .filter(|p| world.read_voxel(*p) == *find)
                .map(|p| (p, with.clone()))
                .collect(),
            EditOp::Grow => range
                .points()
                .filter_map(|p| match world.read_voxel(p) {
                    VoxelSnapshot::Plant(plant) if plant.growth < PlantSnapshot::FULL_GROWTH => {
                        let grown = PlantSnapshot { growth: PlantSnapshot::FULL_GROWTH, ..plant };
                        Some((p, VoxelSnapshot::Plant(grown)))
                    }
                    _ => None,
                })
                .collect(),
            EditOp::Paste { blueprint, anchor, skip_empty } => blueprint
                .entries()
                .filter(|e| !(*skip_empty && e.snapshot.is_empty()))
                .map(|e| (*anchor + e.position, e.snapshot.clone()))
                .collect(),
            EditOp::Move { offset } => plan_move(range, world, *offset),
            EditOp::Stack { direction, count, gap } => plan_stack(range, world, *direction, *count, *gap),
        }
    }
}

/// Clear the source cells the destination does not cover, then write the
/// destination.
fn plan_move(range: &WorldRange, world: &dyn BlockAccess, offset: IVec3) -> Vec<PlannedWrite> {
    let source: Vec<PlannedWrite> = range.points().map(|p| (p, world.read_voxel(p))).collect();
    let destination = range.translated(offset);

    let clears = source
        .iter()
        .filter(|(p, _)| !destination.contains(*p))
        .map(|(p, _)| (*p, VoxelSnapshot::Empty));
    let writes = source.iter().map(|(p, state)| (*p + offset, state.clone()));
    clears.chain(writes).collect()
}

fn plan_stack(range: &WorldRange, world: &dyn BlockAccess, direction: Direction, count: u32, gap: i32) -> Vec<PlannedWrite> {
    let source: Vec<PlannedWrite> = range.points().map(|p| (p, world.read_voxel(p))).collect();
    let stride = range.size()[direction.axis_index()] + gap;
    let step = direction.to_ivec3() * stride;
    let source = &source;

    (1..=count as i32)
        .flat_map(move |i| {
            let offset = step * i;
            source.iter().map(move |(p, state)| (*p + offset, state.clone()))
        })
        .collect()
}
