//! Outcomes of administrative operations.
//!
//! Single operations produce an [`Outcome`]; operations made of several steps
//! collect their outcomes in a [`ResultSet`]; a command reports a
//! [`CommandResult`] at the top.

mod command;
mod outcome;
mod set;

use std::fmt;

pub use command::{CommandFailure, CommandResult};
pub use outcome::{ErrorResult, Outcome};
pub use set::ResultSet;

/// Common view over every kind of result.
pub trait ExecutionResult: fmt::Display + Send + Sync {
	/// The cause, for error results.
	fn error(&self) -> Option<&anyhow::Error> {
		None
	}

	fn is_error(&self) -> bool {
		self.error().is_some()
	}

	/// `Some` when this result is a collection whose entries should be merged
	/// instead of stored as one entry.
	fn as_result_set(&self) -> Option<&ResultSet> {
		None
	}
}
