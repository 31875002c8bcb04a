//! In-memory voxel world, used by tools and tests as a `BlockAccess` host

use std::collections::{HashMap, HashSet};

use glam::IVec3;

use crate::core::types::Result;
use super::port::BlockAccess;
use super::snapshot::VoxelSnapshot;

/// Sparse voxel store. Unset positions read as empty.
pub struct MemoryWorld {
    /// Non-empty voxels
    cells: HashMap<IVec3, VoxelSnapshot>,
    /// Positions that refuse edits
    protected: HashSet<IVec3>,
    /// Positions written since the last `take_modified`
    modified: Vec<IVec3>,
}

impl MemoryWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
            protected: HashSet::new(),
            modified: Vec::new(),
        }
    }

    /// Set a voxel directly, bypassing protection and change tracking
    pub fn place(&mut self, pos: IVec3, state: VoxelSnapshot) {
        if state.is_empty() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, state);
        }
    }

    /// Mark a position as impenetrable
    pub fn protect(&mut self, pos: IVec3) {
        self.protected.insert(pos);
    }

    /// Number of non-empty voxels
    pub fn occupied_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over non-empty voxels in arbitrary order
    pub fn occupied(&self) -> impl Iterator<Item = (&IVec3, &VoxelSnapshot)> {
        self.cells.iter()
    }

    /// Take the list of written positions and clear the internal list
    pub fn take_modified(&mut self) -> Vec<IVec3> {
        std::mem::take(&mut self.modified)
    }
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockAccess for MemoryWorld {
    fn read_voxel(&self, pos: IVec3) -> VoxelSnapshot {
        self.cells.get(&pos).cloned().unwrap_or_default()
    }

    fn write_voxel(&mut self, pos: IVec3, state: &VoxelSnapshot) -> Result<()> {
        self.place(pos, state.clone());
        if !self.modified.contains(&pos) {
            self.modified.push(pos);
        }
        Ok(())
    }

    fn is_impenetrable(&self, pos: IVec3) -> bool {
        self.protected.contains(&pos)
    }
}
