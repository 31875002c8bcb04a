//! Bulk edit commands and their change ledgers
//!
//! An [`EditOp`] describes what to write, a [`Command`] binds it to a range
//! and records every write in a [`ChangeLedger`] so it can be undone.

pub mod ledger;
pub mod op;
pub mod command;

pub use ledger::{ChangeEntry, ChangeLedger, WriteBack};
pub use op::{EditOp, PlannedWrite};
pub use command::{Command, CommandState, EditOutcome, DEFAULT_MIN_Y};
