use std::sync::Arc;

use anyhow::{Context, anyhow};

use super::{Command, require_context};
use crate::config::ConnectionConfig;
use crate::context::SessionContext;
use crate::results::{CommandResult, ErrorResult, Outcome, ResultSet};

/// Opens a session and reports what the server said about itself.
#[derive(Default)]
pub(super) struct TestConnection;

impl Command for TestConnection {
	fn execute(&self, _config: &ConnectionConfig, context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult> {
		let context = require_context(context)?;
		let session = context.session().context("connection is not open")?;

		let mut results = ResultSet::new();
		results.add(Arc::new(Outcome::success(format!(
			"Connection to {}:{} ({}) established",
			session.host(),
			session.port(),
			session.mode()
		))));
		if let Some(version) = session.server_version() {
			results.add(Arc::new(Outcome::success(format!("Server version {version}"))));
		}
		Ok(CommandResult::from_results("Connection test failed", results))
	}
}

/// Reports version and mode of the server.
#[derive(Default)]
pub(super) struct ServerInfo;

impl Command for ServerInfo {
	fn execute(&self, _config: &ConnectionConfig, context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult> {
		let context = require_context(context)?;
		let session = context.session().context("connection is not open")?;

		let outcome = match session.server_version() {
			Some(version) => Outcome::success(version),
			None => Outcome::failure(ErrorResult::new(anyhow!("server at {}:{} did not report a version", session.host(), session.port()))),
		};

		let mut results = ResultSet::new();
		results.add(Arc::new(outcome));
		Ok(CommandResult::from_results("Server information unavailable", results))
	}
}
