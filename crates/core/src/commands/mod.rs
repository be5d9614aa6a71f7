//! Administrative commands and their execution.
//!
//! Commands are registered in a static [`CATALOG`]. [`execute`] opens a
//! [`SessionContext`] for commands that need one, runs the command and closes
//! the context again, turning every failure into an error [`CommandResult`].

mod catalog;
mod config;
mod project;
mod server;

use fsadmin_runtime::Connector;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::context::SessionContext;
use crate::results::CommandResult;

pub use catalog::{CATALOG, CommandSpec, command_names, lookup_command};

/// One administrative operation.
pub trait Command {
	/// Runs the command. `context` is `Some` exactly when the command's
	/// [`CommandSpec::needs_context`] is set.
	fn execute(&self, config: &ConnectionConfig, context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult>;
}

/// Runs `spec` against the server reachable through `connector`.
pub fn execute(spec: &CommandSpec, config: &ConnectionConfig, connector: &dyn Connector) -> CommandResult {
	info!(target: "fsadmin.command", command = spec.name, "executing command");
	let command = (spec.factory)();

	if !spec.needs_context {
		return command.execute(config, None).unwrap_or_else(CommandResult::from_error);
	}

	let mut context = match SessionContext::builder().config(config.clone()).connector(connector).open() {
		Ok(context) => context,
		Err(err) => {
			debug!(target: "fsadmin.command", command = spec.name, error = %err, "could not open session context");
			return CommandResult::from_error(err);
		}
	};

	let result = command.execute(config, Some(&mut context));
	if let Err(err) = context.close() {
		warn!(target: "fsadmin.command", command = spec.name, error = %err, "failed to close session context");
	}

	let result = result.unwrap_or_else(CommandResult::from_error);
	debug!(target: "fsadmin.command", command = spec.name, failed = result.is_error(), "command finished");
	result
}

fn require_context(context: Option<&mut SessionContext>) -> anyhow::Result<&mut SessionContext> {
	context.ok_or_else(|| anyhow::anyhow!("command requires a session context"))
}
