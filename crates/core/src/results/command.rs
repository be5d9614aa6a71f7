use std::fmt;
use std::process::ExitCode;

use thiserror::Error;
use tracing::{error, info};

use super::{ExecutionResult, ResultSet};

const SEPARATOR_WIDTH: usize = 80;

/// Top-level outcome of one command invocation.
#[derive(Debug)]
pub struct CommandResult {
	message: Option<String>,
	results: ResultSet,
	failure: Option<anyhow::Error>,
}

impl CommandResult {
	/// Result of a command that ran its operations; errors among `results`
	/// make the command fail with `message`.
	pub fn from_results(message: impl Into<String>, results: ResultSet) -> Self {
		Self {
			message: Some(message.into()),
			results,
			failure: None,
		}
	}

	/// Result of a command that could not run at all.
	pub fn from_error(err: impl Into<anyhow::Error>) -> Self {
		Self {
			message: None,
			results: ResultSet::new(),
			failure: Some(err.into()),
		}
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	pub fn results(&self) -> &ResultSet {
		&self.results
	}

	pub fn is_error(&self) -> bool {
		self.failure.is_some() || self.results.has_error()
	}

	/// Aggregated failure listing every contained cause, `None` on success.
	pub fn failure(&self) -> Option<CommandFailure> {
		if let Some(err) = &self.failure {
			return Some(CommandFailure {
				message: err.to_string(),
				causes: err.chain().skip(1).map(ToString::to_string).collect(),
			});
		}
		if !self.results.has_error() {
			return None;
		}
		Some(CommandFailure {
			message: self.message.clone().unwrap_or_else(|| "command failed".to_string()),
			causes: self.results.errors().map(|cause| format!("{cause:#}")).collect(),
		})
	}

	/// Process exit code: success unless [`is_error`](Self::is_error).
	pub fn exit_code(&self) -> ExitCode {
		if self.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
	}

	/// Logs every contained result; errors at error level, others at info.
	pub fn log(&self) {
		if let Some(err) = &self.failure {
			let rendered = format!("{err:#}");
			error!(target: "fsadmin.results", error = %rendered, "command failed");
		}
		for result in &self.results {
			if result.is_error() {
				error!(target: "fsadmin.results", "{result}");
			} else {
				info!(target: "fsadmin.results", "{result}");
			}
		}
		if !self.results.is_empty() {
			info!(target: "fsadmin.results", "{}", "=".repeat(SEPARATOR_WIDTH));
		}
	}
}

impl fmt::Display for CommandResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(err) = &self.failure {
			return write!(f, "{err:#}");
		}
		match &self.message {
			Some(message) if self.results.has_error() || self.results.is_empty() => f.write_str(message),
			_ => write!(f, "{}", self.results),
		}
	}
}

impl ExecutionResult for CommandResult {
	fn error(&self) -> Option<&anyhow::Error> {
		self.failure.as_ref().or_else(|| self.results.errors().next())
	}

	fn is_error(&self) -> bool {
		CommandResult::is_error(self)
	}

	fn as_result_set(&self) -> Option<&ResultSet> {
		self.failure.is_none().then_some(&self.results)
	}
}

/// All causes that made a command fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", render_causes(.causes))]
pub struct CommandFailure {
	message: String,
	causes: Vec<String>,
}

impl CommandFailure {
	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn causes(&self) -> &[String] {
		&self.causes
	}
}

fn render_causes(causes: &[String]) -> String {
	causes.iter().map(|cause| format!("\n  caused by: {cause}")).collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use anyhow::anyhow;

	use super::*;
	use crate::results::{ErrorResult, Outcome};

	#[test]
	fn successful_results_exit_cleanly() {
		let mut results = ResultSet::new();
		results.add(Arc::new(Outcome::success("schedule started")));
		let result = CommandResult::from_results("schedule control failed", results);

		assert!(!result.is_error());
		assert!(result.failure().is_none());
		assert_eq!(format!("{:?}", result.exit_code()), format!("{:?}", ExitCode::SUCCESS));
		assert_eq!(result.to_string(), "schedule started");
	}

	#[test]
	fn failure_lists_every_error_entry() {
		let mut results = ResultSet::new();
		results.add(Arc::new(Outcome::success("module a installed")));
		results.add(Arc::new(ErrorResult::new(anyhow!("module b: missing dependency"))));
		results.add(Arc::new(ErrorResult::with_message("module c", anyhow!("checksum mismatch"))));
		let result = CommandResult::from_results("module installation failed", results);

		assert!(result.is_error());
		assert_eq!(format!("{:?}", result.exit_code()), format!("{:?}", ExitCode::FAILURE));
		assert_eq!(result.to_string(), "module installation failed");
		let failure = result.failure().unwrap();
		assert_eq!(failure.message(), "module installation failed");
		assert_eq!(failure.causes(), ["module b: missing dependency", "checksum mismatch"]);
		assert_eq!(
			failure.to_string(),
			"module installation failed\n  caused by: module b: missing dependency\n  caused by: checksum mismatch"
		);
	}

	#[test]
	fn from_error_keeps_cause_chain() {
		let result = CommandResult::from_error(anyhow!("connection refused").context("cannot open session"));
		assert!(result.is_error());
		assert!(result.results().is_empty());

		let failure = result.failure().unwrap();
		assert_eq!(failure.message(), "cannot open session");
		assert_eq!(failure.causes(), ["connection refused"]);
		assert_eq!(result.to_string(), "cannot open session: connection refused");
	}

	#[test]
	fn command_result_merges_like_a_set() {
		let mut inner = ResultSet::new();
		inner.add(Arc::new(Outcome::success("a")));
		let command = CommandResult::from_results("ok", inner);

		let mut outer = ResultSet::new();
		outer.add(Arc::new(command));
		assert_eq!(outer.len(), 1);
		assert_eq!(outer.to_string(), "a");
	}

	#[test]
	fn log_does_not_panic_without_subscriber() {
		let mut results = ResultSet::new();
		results.add(Arc::new(ErrorResult::new(anyhow!("boom"))));
		CommandResult::from_results("failed", results).log();
		CommandResult::from_error(anyhow!("unreachable")).log();
	}
}
