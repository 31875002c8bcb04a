//! Interface to the host world's voxel storage.

use std::collections::BTreeMap;

use glam::IVec3;

use crate::core::types::Result;
use crate::math::WorldRange;
use super::snapshot::VoxelSnapshot;

/// Per-voxel read/write access supplied by the host world.
///
/// Each call is atomic for its voxel. There is no cross-voxel transaction;
/// commands provide rollback on top of this.
pub trait BlockAccess {
    /// Current state at `pos`
    fn read_voxel(&self, pos: IVec3) -> VoxelSnapshot;

    /// Replace the state at `pos`. Failures are host faults.
    fn write_voxel(&mut self, pos: IVec3, state: &VoxelSnapshot) -> Result<()>;

    /// Position is protected and must be skipped, not retried
    fn is_impenetrable(&self, pos: IVec3) -> bool;
}

/// Count cells per type name inside `range`
pub fn distribution(world: &dyn BlockAccess, range: &WorldRange) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for pos in range.points() {
        let state = world.read_voxel(pos);
        *counts.entry(state.type_name().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::MemoryWorld;

    #[test]
    fn test_distribution_counts_empty() {
        let mut world = MemoryWorld::new();
        world.place(IVec3::ZERO, VoxelSnapshot::block("Stone"));
        world.place(IVec3::X, VoxelSnapshot::block("Stone"));
        world.place(IVec3::Y, VoxelSnapshot::block("Dirt"));

        let counts = distribution(&world, &WorldRange::new(IVec3::ZERO, IVec3::new(1, 1, 0)));
        assert_eq!(counts["Stone"], 2);
        assert_eq!(counts["Dirt"], 1);
        assert_eq!(counts["Empty"], 1);
    }
}
