//! Ordered record of every voxel a command wrote.

use glam::IVec3;

use crate::core::error::Error;
use crate::voxel::{BlockAccess, VoxelSnapshot};

/// One write: where, what was there, what replaced it
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEntry {
    pub position: IVec3,
    pub before: VoxelSnapshot,
    pub after: VoxelSnapshot,
}

/// Result of writing ledger entries back into the world.
///
/// Writing continues past host failures; the entries that could not be
/// written are listed so they can be retried.
#[derive(Debug, Default)]
pub struct WriteBack {
    /// Voxels written
    pub written: usize,
    /// Indices of entries whose write failed, ascending
    pub failed: Vec<usize>,
    /// First host error encountered
    pub error: Option<Error>,
}

impl WriteBack {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes in mutation order. Owned by exactly one command.
#[derive(Debug, Default)]
pub struct ChangeLedger {
    entries: Vec<ChangeEntry>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a write
    pub fn record(&mut self, position: IVec3, before: VoxelSnapshot, after: VoxelSnapshot) {
        self.entries.push(ChangeEntry { position, before, after });
    }

    /// Drop the most recent entry (its write did not happen)
    pub(crate) fn discard_last(&mut self) -> Option<ChangeEntry> {
        self.entries.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Restore every `before` state, newest first.
    ///
    /// Positions that have become impenetrable since are skipped.
    pub fn rewind(&self, world: &mut dyn BlockAccess) -> WriteBack {
        self.write_back(world, (0..self.entries.len()).rev(), |e| &e.before)
    }

    /// Restore the `before` states of the given entries only, newest first
    pub fn rewind_entries(&self, world: &mut dyn BlockAccess, indices: &[usize]) -> WriteBack {
        self.write_back(world, sorted(indices).into_iter().rev(), |e| &e.before)
    }

    /// Write every `after` state again, oldest first
    pub fn replay(&self, world: &mut dyn BlockAccess) -> WriteBack {
        self.write_back(world, 0..self.entries.len(), |e| &e.after)
    }

    /// Write the `after` states of the given entries only, oldest first
    pub fn replay_entries(&self, world: &mut dyn BlockAccess, indices: &[usize]) -> WriteBack {
        self.write_back(world, sorted(indices).into_iter(), |e| &e.after)
    }

    fn write_back(
        &self,
        world: &mut dyn BlockAccess,
        order: impl Iterator<Item = usize>,
        state: impl Fn(&ChangeEntry) -> &VoxelSnapshot,
    ) -> WriteBack {
        let mut report = WriteBack::default();
        for index in order {
            let Some(entry) = self.entries.get(index) else {
                continue;
            };
            if world.is_impenetrable(entry.position) {
                log::warn!("Skipping protected voxel {}", entry.position);
                continue;
            }
            match world.write_voxel(entry.position, state(entry)) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    log::warn!("Write to {} failed: {}", entry.position, e);
                    report.failed.push(index);
                    report.error.get_or_insert(e);
                }
            }
        }
        report.failed.sort_unstable();
        report
    }
}

fn sorted(indices: &[usize]) -> Vec<usize> {
    let mut indices = indices.to_vec();
    indices.sort_unstable();
    indices.dedup();
    indices
}
