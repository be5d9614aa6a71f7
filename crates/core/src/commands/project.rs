use std::sync::Arc;

use anyhow::{Context, bail};

use super::{Command, require_context};
use crate::config::ConnectionConfig;
use crate::context::SessionContext;
use crate::results::{CommandResult, Outcome, ResultSet};

/// Lists the projects on the server.
#[derive(Default)]
pub(super) struct ProjectList;

impl Command for ProjectList {
	fn execute(&self, _config: &ConnectionConfig, context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult> {
		let context = require_context(context)?;
		let session = context.session().context("connection is not open")?;
		let projects = session.projects().context("cannot list projects")?;

		let mut results = ResultSet::new();
		for project in projects {
			results.add(Arc::new(Outcome::success(project)));
		}
		Ok(CommandResult::from_results("Listing projects failed", results))
	}
}

/// Shows the project resolved for this session.
#[derive(Default)]
pub(super) struct ProjectInfoCommand;

impl Command for ProjectInfoCommand {
	fn execute(&self, config: &ConnectionConfig, context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult> {
		let context = require_context(context)?;
		let Some(project) = context.project() else {
			match config.project_name() {
				Some(name) => bail!("project '{name}' does not exist on the server"),
				None => bail!("no project configured"),
			}
		};

		let mut results = ResultSet::new();
		results.add(Arc::new(Outcome::success(project.clone())));
		if let Some(description) = &project.description {
			results.add(Arc::new(Outcome::success(format!("Description: {description}"))));
		}
		Ok(CommandResult::from_results("Project information unavailable", results))
	}
}
