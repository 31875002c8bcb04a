//! Per-user editing state: selection, clipboard and bounded undo/redo history.

pub mod stack;
pub mod manager;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use glam::IVec3;

use crate::blueprint::{AuthorInformation, Blueprint, BlueprintStore};
use crate::core::config::EditConfig;
use crate::core::error::PreconditionError;
use crate::core::types::{Result, UserId};
use crate::edit::{Command, EditOp, EditOutcome};
use crate::math::{Direction, Selection, WorldRange};
use crate::voxel::{self, BlockAccess};

pub use stack::BoundedStack;
pub use manager::SessionManager;

/// One user's editing state.
///
/// Commands run one at a time; `executing` only observes the running flag
/// of the last tracked command and never keeps it alive.
#[derive(Debug)]
pub struct Session {
    user: UserId,
    author: AuthorInformation,
    pub selection: Selection,
    executed: BoundedStack<Command>,
    undone: BoundedStack<Command>,
    executing: Weak<AtomicBool>,
    clipboard: Option<Arc<Blueprint>>,
    min_y: i32,
    engine_version: String,
}

impl Session {
    pub fn new(user: UserId, config: &EditConfig) -> Self {
        let mut author = AuthorInformation::new(format!("user-{}", user));
        author.id = Some(user.to_string());
        Self {
            user,
            author,
            selection: Selection::default(),
            executed: BoundedStack::new(config.history_capacity),
            undone: BoundedStack::new(config.history_capacity),
            executing: Weak::new(),
            clipboard: None,
            min_y: config.min_anchor_y,
            engine_version: config.engine_version.clone(),
        }
    }

    /// Name recorded as author of captured blueprints
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author.name = name.into();
        self
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    // --- Selection ---

    pub fn set_first(&mut self, pos: IVec3) {
        self.selection.first = Some(pos);
    }

    pub fn set_second(&mut self, pos: IVec3) {
        self.selection.second = Some(pos);
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    pub fn set_selection(&mut self, range: WorldRange) {
        self.selection.set_range(range);
    }

    /// Current normalized range
    pub fn range(&self) -> std::result::Result<WorldRange, PreconditionError> {
        self.selection.require_range()
    }

    pub fn expand_selection(&mut self, direction: Direction, amount: i32) -> std::result::Result<WorldRange, PreconditionError> {
        self.edit_selection(|range| range.expand(direction, amount))
    }

    pub fn contract_selection(&mut self, direction: Direction, amount: i32) -> std::result::Result<WorldRange, PreconditionError> {
        self.edit_selection(|range| range.contract(direction, amount))
    }

    pub fn shift_selection(&mut self, direction: Direction, amount: i32) -> std::result::Result<WorldRange, PreconditionError> {
        self.edit_selection(|range| range.shift(direction, amount))
    }

    fn edit_selection(&mut self, edit: impl FnOnce(&mut WorldRange)) -> std::result::Result<WorldRange, PreconditionError> {
        let mut range = self.selection.require_range()?;
        edit(&mut range);
        self.selection.set_range(range);
        Ok(range)
    }

    // --- Commands ---

    /// True while a tracked command is mid-invoke
    pub fn is_busy(&self) -> bool {
        self.executing
            .upgrade()
            .is_some_and(|running| running.load(Ordering::SeqCst))
    }

    /// Remember `command` as the one in flight
    pub fn track(&mut self, command: &Command) {
        self.executing = Arc::downgrade(command.running_flag());
    }

    /// Run `op` over the current selection (or its own region for paste)
    pub fn execute(&mut self, op: EditOp, world: &mut dyn BlockAccess) -> Result<EditOutcome> {
        let command = Command::for_selection(op, &self.selection)?.with_min_y(self.min_y);
        self.run(command, world)
    }

    /// Invoke a prepared command and record it in the history.
    ///
    /// Only commands that changed something are pushed. A failed command is
    /// pushed only when its rollback left writes behind, so they can still
    /// be undone. A new entry invalidates the redo stack.
    pub fn run(&mut self, mut command: Command, world: &mut dyn BlockAccess) -> Result<EditOutcome> {
        if self.is_busy() {
            return Err(PreconditionError::CommandInFlight.into());
        }
        self.track(&command);
        match command.invoke(world) {
            Ok(outcome) => {
                if !command.ledger().is_empty() {
                    self.push_executed(command);
                }
                Ok(outcome)
            }
            Err(e) => {
                if command.can_undo() {
                    log::warn!("User {}: keeping failed command with {} unrestored voxels", self.user, command.pending().len());
                    self.push_executed(command);
                }
                Err(e)
            }
        }
    }

    fn push_executed(&mut self, command: Command) {
        if self.executed.push(command).is_some() {
            log::debug!("User {}: oldest undo entry evicted", self.user);
        }
        self.undone.clear();
    }

    /// Undo up to `count` commands, newest first. Returns how many were undone.
    pub fn undo(&mut self, world: &mut dyn BlockAccess, count: usize) -> Result<usize> {
        if self.is_busy() {
            return Err(PreconditionError::CommandInFlight.into());
        }
        let count = count.min(self.executed.len());
        if count == 0 {
            return Err(PreconditionError::NothingToUndo.into());
        }

        for i in 1..=count {
            let Some(mut command) = self.executed.pop() else {
                return Err(PreconditionError::NothingToUndo.into());
            };
            if let Err(e) = command.undo(world) {
                self.executed.push(command);
                return Err(e);
            }
            self.undone.push(command);
            if count > 1 {
                log::info!("Undo {}/{} done", i, count);
            }
        }
        Ok(count)
    }

    /// Redo up to `count` undone commands. Returns how many were redone.
    pub fn redo(&mut self, world: &mut dyn BlockAccess, count: usize) -> Result<usize> {
        if self.is_busy() {
            return Err(PreconditionError::CommandInFlight.into());
        }
        let count = count.min(self.undone.len());
        if count == 0 {
            return Err(PreconditionError::NothingToRedo.into());
        }

        for i in 1..=count {
            let Some(mut command) = self.undone.pop() else {
                return Err(PreconditionError::NothingToRedo.into());
            };
            if let Err(e) = command.redo(world) {
                self.undone.push(command);
                return Err(e);
            }
            self.executed.push(command);
            if count > 1 {
                log::info!("Redo {}/{} done", i, count);
            }
        }
        Ok(count)
    }

    pub fn undo_depth(&self) -> usize {
        self.executed.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    // --- Clipboard ---

    pub fn clipboard(&self) -> Option<&Arc<Blueprint>> {
        self.clipboard.as_ref()
    }

    fn require_clipboard(&self) -> std::result::Result<Arc<Blueprint>, PreconditionError> {
        self.clipboard.clone().ok_or(PreconditionError::EmptyClipboard)
    }

    /// Capture the selection into the clipboard, relative to `origin`.
    /// Returns the number of captured cells.
    pub fn copy(&mut self, world: &dyn BlockAccess, origin: IVec3) -> Result<usize> {
        let range = self.selection.require_range()?;
        let mut blueprint = Blueprint::capture(world, &range, origin, self.author.clone());
        blueprint.engine_version = self.engine_version.clone();
        let captured = blueprint.len();
        self.clipboard = Some(Arc::new(blueprint));
        log::info!("User {}: copied {} cells", self.user, captured);
        Ok(captured)
    }

    /// Copy, then clear the selection as one undoable command
    ///
    /// The previous clipboard is kept if the delete fails.
    pub fn cut(&mut self, world: &mut dyn BlockAccess, origin: IVec3) -> Result<EditOutcome> {
        if self.is_busy() {
            return Err(PreconditionError::CommandInFlight.into());
        }
        let previous = self.clipboard.clone();
        self.copy(world, origin)?;
        self.execute(EditOp::delete(), world).inspect_err(|_| {
            self.clipboard = previous;
        })
    }

    /// Rotate the clipboard about +Y
    pub fn rotate_clipboard(&mut self, degrees: i32) -> Result<()> {
        let rotated = self.require_clipboard()?.rotated(degrees)?;
        self.clipboard = Some(Arc::new(rotated));
        Ok(())
    }

    /// Write the clipboard with its origin at `anchor`
    pub fn paste(&mut self, world: &mut dyn BlockAccess, anchor: IVec3, skip_empty: bool) -> Result<EditOutcome> {
        let op = EditOp::paste(self.require_clipboard()?, anchor, skip_empty)?;
        self.execute(op, world)
    }

    /// Save the clipboard under `name`
    pub fn export(&self, store: &BlueprintStore, name: &str) -> Result<PathBuf> {
        let blueprint = self.require_clipboard()?;
        store.save(name, &blueprint)
    }

    /// Load `name` into the clipboard. Returns the number of cells.
    pub fn import(&mut self, store: &BlueprintStore, name: &str) -> Result<usize> {
        let blueprint = store.load(name)?;
        let cells = blueprint.len();
        self.clipboard = Some(Arc::new(blueprint));
        Ok(cells)
    }

    /// Per-type cell counts inside the selection
    pub fn distribution(&self, world: &dyn BlockAccess) -> Result<BTreeMap<String, usize>> {
        let range = self.selection.require_range()?;
        Ok(voxel::distribution(world, &range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::edit::CommandState;
    use crate::voxel::{BlockRegistry, MemoryWorld, VoxelSnapshot};

    /// World that rejects writes once its budget runs out, and always
    /// at the `broken` position
    struct FlakyWorld {
        inner: MemoryWorld,
        writes_left: usize,
        broken: Option<IVec3>,
    }

    impl BlockAccess for FlakyWorld {
        fn read_voxel(&self, pos: IVec3) -> VoxelSnapshot {
            self.inner.read_voxel(pos)
        }

        fn write_voxel(&mut self, pos: IVec3, state: &VoxelSnapshot) -> Result<()> {
            if self.writes_left == 0 || self.broken == Some(pos) {
                return Err(Error::Unexpected(format!("write to {} rejected", pos)));
            }
            self.writes_left -= 1;
            self.inner.write_voxel(pos, state)
        }

        fn is_impenetrable(&self, pos: IVec3) -> bool {
            self.inner.is_impenetrable(pos)
        }
    }

    fn sand_row(writes_left: usize) -> FlakyWorld {
        let mut inner = MemoryWorld::new();
        for z in 0..5 {
            inner.place(IVec3::new(0, 0, z), VoxelSnapshot::block("Sand"));
        }
        FlakyWorld { inner, writes_left, broken: None }
    }

    fn session() -> Session {
        Session::new(7, &EditConfig::default())
    }

    fn precondition(err: Error) -> PreconditionError {
        match err {
            Error::Precondition(p) => p,
            other => panic!("Expected precondition error, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_requires_selection() {
        let mut world = MemoryWorld::new();
        let mut session = session();
        let err = session.execute(EditOp::delete(), &mut world).unwrap_err();
        assert_eq!(precondition(err), PreconditionError::SelectionNotSet);
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let registry = BlockRegistry::with_defaults();
        let mut world = MemoryWorld::new();
        let mut session = session();

        for x in 0..11 {
            session.set_selection(WorldRange::from_point(IVec3::new(x, 0, 0)));
            session.execute(EditOp::set(&registry, "stone").unwrap(), &mut world).unwrap();
        }
        assert_eq!(session.undo_depth(), 10);

        assert_eq!(session.undo(&mut world, 20).unwrap(), 10);
        assert_eq!(world.read_voxel(IVec3::new(0, 0, 0)), VoxelSnapshot::block("Stone"));
        for x in 1..11 {
            assert!(world.read_voxel(IVec3::new(x, 0, 0)).is_empty());
        }

        let err = session.undo(&mut world, 1).unwrap_err();
        assert_eq!(precondition(err), PreconditionError::NothingToUndo);
        assert_eq!(session.redo_depth(), 10);
    }

    #[test]
    fn test_redo_restores_newest_first() {
        let registry = BlockRegistry::with_defaults();
        let mut world = MemoryWorld::new();
        let mut session = session();
        session.set_selection(WorldRange::from_point(IVec3::ZERO));
        session.execute(EditOp::set(&registry, "dirt").unwrap(), &mut world).unwrap();
        session.execute(EditOp::set(&registry, "sand").unwrap(), &mut world).unwrap();

        session.undo(&mut world, 2).unwrap();
        assert!(world.read_voxel(IVec3::ZERO).is_empty());

        assert_eq!(session.redo(&mut world, 1).unwrap(), 1);
        assert_eq!(world.read_voxel(IVec3::ZERO), VoxelSnapshot::block("Dirt"));
        assert_eq!(session.redo(&mut world, 5).unwrap(), 1);
        assert_eq!(world.read_voxel(IVec3::ZERO), VoxelSnapshot::block("Sand"));

        let err = session.redo(&mut world, 1).unwrap_err();
        assert_eq!(precondition(err), PreconditionError::NothingToRedo);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let registry = BlockRegistry::with_defaults();
        let mut world = MemoryWorld::new();
        let mut session = session();
        session.set_selection(WorldRange::from_point(IVec3::ZERO));
        session.execute(EditOp::set(&registry, "dirt").unwrap(), &mut world).unwrap();
        session.undo(&mut world, 1).unwrap();
        assert_eq!(session.redo_depth(), 1);

        session.execute(EditOp::set(&registry, "clay").unwrap(), &mut world).unwrap();
        assert_eq!(session.redo_depth(), 0);
    }

    #[test]
    fn test_no_change_not_pushed() {
        let registry = BlockRegistry::with_defaults();
        let mut world = MemoryWorld::new();
        let mut session = session();
        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::splat(2)));
        let outcome = session.execute(EditOp::drain(&registry).unwrap(), &mut world).unwrap();
        assert_eq!(outcome.blocks_changed, 0);
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_undo_refused_while_busy() {
        let mut world = MemoryWorld::new();
        let mut session = session();
        let command = Command::new(EditOp::delete(), WorldRange::from_point(IVec3::ZERO));
        session.track(&command);
        command.running_flag().store(true, Ordering::SeqCst);

        let err = session.undo(&mut world, 1).unwrap_err();
        assert_eq!(precondition(err), PreconditionError::CommandInFlight);
        assert_eq!(command.state(), CommandState::Created);

        // Dropping the command releases the session
        drop(command);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_selection_editing() {
        let mut session = session();
        assert!(session.expand_selection(Direction::Up, 2).is_err());

        session.set_first(IVec3::new(3, 0, 0));
        session.set_second(IVec3::new(0, 2, 1));
        let range = session.expand_selection(Direction::Up, 2).unwrap();
        assert_eq!(range.max.y, 4);
        let range = session.shift_selection(Direction::East, 1).unwrap();
        assert_eq!(range.min.x, 1);
        let range = session.contract_selection(Direction::Up, 1).unwrap();
        assert_eq!(range.max.y, 3);

        session.reset_selection();
        assert!(session.range().is_err());
    }

    #[test]
    fn test_cut_and_paste() {
        let mut world = MemoryWorld::new();
        world.place(IVec3::new(0, 0, 0), VoxelSnapshot::block("Stone"));
        world.place(IVec3::new(1, 0, 0), VoxelSnapshot::block("Dirt"));
        let mut session = session();

        assert_eq!(
            precondition(session.paste(&mut world, IVec3::ZERO, false).unwrap_err()),
            PreconditionError::EmptyClipboard
        );

        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::new(1, 0, 0)));
        let outcome = session.cut(&mut world, IVec3::ZERO).unwrap();
        assert_eq!(outcome.blocks_changed, 2);
        assert_eq!(world.occupied_count(), 0);

        session.rotate_clipboard(180).unwrap();
        session.paste(&mut world, IVec3::new(5, 0, 5), true).unwrap();
        assert_eq!(world.read_voxel(IVec3::new(5, 0, 5)), VoxelSnapshot::block("Stone"));
        assert_eq!(world.read_voxel(IVec3::new(4, 0, 5)), VoxelSnapshot::block("Dirt"));
        assert_eq!(session.undo_depth(), 2);

        session.undo(&mut world, 1).unwrap();
        assert_eq!(world.occupied_count(), 0);
    }

    #[test]
    fn test_distribution() {
        let mut world = MemoryWorld::new();
        world.place(IVec3::ZERO, VoxelSnapshot::block("Sand"));
        let mut session = session();
        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::new(0, 0, 2)));
        let counts = session.distribution(&world).unwrap();
        assert_eq!(counts["Sand"], 1);
        assert_eq!(counts["Empty"], 2);
    }

    #[test]
    fn test_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlueprintStore::new(dir.path(), true);
        let mut world = MemoryWorld::new();
        world.place(IVec3::ZERO, VoxelSnapshot::block("Granite"));

        let mut session = session().with_author_name("mason");
        assert!(session.export(&store, "tower").is_err());

        session.set_selection(WorldRange::from_point(IVec3::ZERO));
        session.copy(&world, IVec3::ZERO).unwrap();
        session.export(&store, "tower").unwrap();

        let mut other = Session::new(8, &EditConfig::default());
        assert_eq!(other.import(&store, "tower").unwrap(), 1);
        let clipboard = other.clipboard().unwrap();
        assert_eq!(clipboard.author.name, "mason");
        assert_eq!(clipboard.blocks[0].snapshot, VoxelSnapshot::block("Granite"));
    }

    #[test]
    fn test_unrestored_failure_kept_for_undo() {
        let mut world = sand_row(3);
        let mut session = session();
        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::new(0, 0, 4)));

        let err = session.execute(EditOp::delete(), &mut world).unwrap_err();
        assert!(matches!(err, Error::Unexpected(_)));
        assert_eq!(session.undo_depth(), 1);
        assert_eq!(world.inner.occupied_count(), 2);

        world.writes_left = 100;
        assert_eq!(session.undo(&mut world, 1).unwrap(), 1);
        assert_eq!(world.inner.occupied_count(), 5);
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_clean_rollback_not_pushed() {
        let mut world = sand_row(100);
        world.broken = Some(IVec3::new(0, 0, 2));
        let mut session = session();
        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::new(0, 0, 4)));

        assert!(session.execute(EditOp::delete(), &mut world).is_err());
        assert_eq!(session.undo_depth(), 0);
        assert_eq!(world.inner.occupied_count(), 5);
    }

    #[test]
    fn test_interrupted_undo_keeps_history_consistent() {
        let mut world = sand_row(5);
        let mut session = session();
        session.set_selection(WorldRange::new(IVec3::ZERO, IVec3::new(0, 0, 4)));
        session.execute(EditOp::delete(), &mut world).unwrap();

        world.writes_left = 2;
        assert!(session.undo(&mut world, 1).is_err());
        assert_eq!(session.undo_depth(), 1);
        assert_eq!(session.redo_depth(), 0);
        assert_eq!(world.inner.occupied_count(), 2);

        // Only the three voxels still missing are written on retry
        world.writes_left = 3;
        assert_eq!(session.undo(&mut world, 1).unwrap(), 1);
        assert_eq!(world.inner.occupied_count(), 5);
        assert_eq!(session.redo_depth(), 1);

        world.writes_left = 1;
        assert!(session.redo(&mut world, 1).is_err());
        assert_eq!(session.redo_depth(), 1);
        world.writes_left = 4;
        assert_eq!(session.redo(&mut world, 1).unwrap(), 1);
        assert_eq!(world.inner.occupied_count(), 0);
    }

    #[test]
    fn test_failed_cut_keeps_clipboard() {
        let mut world = MemoryWorld::new();
        world.place(IVec3::ZERO, VoxelSnapshot::block("Stone"));
        let mut session = session();
        session.set_selection(WorldRange::from_point(IVec3::ZERO));
        session.copy(&world, IVec3::ZERO).unwrap();
        let before = session.clipboard().cloned();

        world.place(IVec3::ZERO, VoxelSnapshot::block("Dirt"));
        let mut failing = FlakyWorld { inner: world, writes_left: 0, broken: None };
        assert!(session.cut(&mut failing, IVec3::ZERO).is_err());
        assert_eq!(session.clipboard().cloned(), before);

        let command = Command::new(EditOp::delete(), WorldRange::from_point(IVec3::ZERO));
        session.track(&command);
        command.running_flag().store(true, Ordering::SeqCst);
        let err = session.cut(&mut failing, IVec3::ZERO).unwrap_err();
        assert_eq!(precondition(err), PreconditionError::CommandInFlight);
        assert_eq!(session.clipboard().cloned(), before);
    }
}
