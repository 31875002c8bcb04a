//! A single undoable bulk edit.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::error::PreconditionError;
use crate::core::types::Result;
use crate::math::{Selection, WorldRange};
use crate::voxel::BlockAccess;
use super::ledger::{ChangeLedger, WriteBack};
use super::op::EditOp;

/// Default lowest anchor height for anchored shapes
pub const DEFAULT_MIN_Y: i32 = 1;

/// Lifecycle of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandState {
    Created,
    Running,
    Completed,
    Failed,
    Undone,
}

/// Result of a successful invoke
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub blocks_changed: usize,
    pub elapsed: Duration,
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} blocks changed in {}ms", self.blocks_changed, self.elapsed.as_millis())
    }
}

/// An edit operation bound to a range, with everything needed to take it
/// back.
#[derive(Debug)]
pub struct Command {
    op: EditOp,
    range: WorldRange,
    min_y: i32,
    ledger: ChangeLedger,
    state: CommandState,
    /// Shared with the owning session as a weak "busy" marker
    running: Arc<AtomicBool>,
    blocks_changed: usize,
    elapsed: Duration,
    /// Ledger entries an interrupted rollback, undo or redo did not write.
    /// They belong to the undo direction unless the state is `Undone`.
    pending: Vec<usize>,
}

impl Command {
    /// Bind an operation to an explicit range
    pub fn new(op: EditOp, range: WorldRange) -> Self {
        Self {
            op,
            range,
            min_y: DEFAULT_MIN_Y,
            ledger: ChangeLedger::new(),
            state: CommandState::Created,
            running: Arc::new(AtomicBool::new(false)),
            blocks_changed: 0,
            elapsed: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    /// Bind an operation to the user's selection. Operations that carry
    /// their own region (paste) do not need one.
    pub fn for_selection(op: EditOp, selection: &Selection) -> std::result::Result<Self, PreconditionError> {
        let range = match op.own_range() {
            Some(range) => range,
            None => selection.require_range()?,
        };
        Ok(Self::new(op, range))
    }

    /// Lowest anchor height for anchored shapes
    pub fn with_min_y(mut self, min_y: i32) -> Self {
        self.min_y = min_y;
        self
    }

    /// Apply the operation.
    ///
    /// Protected positions are skipped. Every write is recorded before it
    /// is made; if the host rejects a write, everything written so far is
    /// rolled back and the command ends `Failed`. Writes the rollback could
    /// not restore stay in the ledger and can still be undone.
    pub fn invoke(&mut self, world: &mut dyn BlockAccess) -> Result<EditOutcome> {
        if self.state != CommandState::Created {
            return Err(PreconditionError::AlreadyExecuted.into());
        }

        self.running.store(true, Ordering::SeqCst);
        self.state = CommandState::Running;
        let start = Instant::now();

        let result = self.apply(world);

        self.elapsed = start.elapsed();
        self.running.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                self.state = CommandState::Completed;
                let outcome = self.outcome();
                log::info!("{}: {}", self.kind_name(), outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.state = CommandState::Failed;
                log::error!("{} failed after {} writes: {}", self.kind_name(), self.blocks_changed, e);
                self.roll_back(world);
                Err(e)
            }
        }
    }

    fn apply(&mut self, world: &mut dyn BlockAccess) -> Result<()> {
        let plan = self.op.plan(&self.range, world, self.min_y);
        log::debug!("{} planned {} writes over {:?}", self.kind_name(), plan.len(), self.range);

        for (pos, state) in plan {
            if world.is_impenetrable(pos) {
                continue;
            }
            let before = world.read_voxel(pos);
            self.ledger.record(pos, before, state.clone());
            if let Err(e) = world.write_voxel(pos, &state) {
                self.ledger.discard_last();
                return Err(e);
            }
            self.blocks_changed += 1;
        }
        Ok(())
    }

    fn roll_back(&mut self, world: &mut dyn BlockAccess) {
        let report = self.ledger.rewind(world);
        if report.is_complete() {
            log::info!("Rolled back {} voxels", report.written);
            self.ledger.clear();
            self.blocks_changed = 0;
        } else {
            log::error!(
                "Rollback left {} of {} voxels unrestored; they remain undoable",
                report.failed.len(),
                self.ledger.len()
            );
            self.pending = report.failed;
        }
    }

    /// Whether `undo` has anything to restore
    pub fn can_undo(&self) -> bool {
        match self.state {
            CommandState::Completed => !self.ledger.is_empty(),
            CommandState::Failed => !self.pending.is_empty(),
            _ => false,
        }
    }

    /// Whether `redo` has anything to write
    pub fn can_redo(&self) -> bool {
        self.state == CommandState::Undone && !self.ledger.is_empty()
    }

    /// Restore every voxel this command changed.
    ///
    /// If the host rejects some restores, the rest are still made and the
    /// command keeps its state; calling `undo` again retries only what is
    /// left.
    pub fn undo(&mut self, world: &mut dyn BlockAccess) -> Result<usize> {
        if !self.can_undo() {
            return Err(PreconditionError::NothingToUndo.into());
        }
        let report = if self.pending.is_empty() {
            self.ledger.rewind(world)
        } else {
            self.ledger.rewind_entries(world, &self.pending)
        };
        let restored = self.settle(report, CommandState::Undone)?;
        log::debug!("Undid {}: {} voxels restored", self.kind_name(), restored);
        Ok(restored)
    }

    /// Write the recorded results again.
    ///
    /// Replays the exact writes of the first invoke rather than planning
    /// anew, so protection decisions stay identical. Interrupted redos
    /// resume like interrupted undos.
    pub fn redo(&mut self, world: &mut dyn BlockAccess) -> Result<usize> {
        if !self.can_redo() {
            return Err(PreconditionError::NothingToRedo.into());
        }
        let report = if self.pending.is_empty() {
            self.ledger.replay(world)
        } else {
            self.ledger.replay_entries(world, &self.pending)
        };
        let written = self.settle(report, CommandState::Completed)?;
        log::debug!("Redid {}: {} voxels written", self.kind_name(), written);
        Ok(written)
    }

    fn settle(&mut self, report: WriteBack, done: CommandState) -> Result<usize> {
        if let Some(e) = report.error {
            log::error!("{}: {} voxels left to retry", self.kind_name(), report.failed.len());
            self.pending = report.failed;
            return Err(e);
        }
        self.pending.clear();
        self.state = done;
        Ok(report.written)
    }

    /// Ledger entries still waiting for an interrupted undo or redo
    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    pub fn outcome(&self) -> EditOutcome {
        EditOutcome {
            blocks_changed: self.blocks_changed,
            elapsed: self.elapsed,
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn running_flag(&self) -> &Arc<AtomicBool> {
        &self.running
    }

    pub fn blocks_changed(&self) -> usize {
        self.blocks_changed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn range(&self) -> &WorldRange {
        &self.range
    }

    pub fn op(&self) -> &EditOp {
        &self.op
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    fn kind_name(&self) -> &'static str {
        match self.op {
            EditOp::Set { .. } => "set",
            EditOp::Replace { .. } => "replace",
            EditOp::Grow => "grow",
            EditOp::Paste { .. } => "paste",
            EditOp::Move { .. } => "move",
            EditOp::Stack { .. } => "stack",
        }
    }
}
