use std::sync::Arc;

use anyhow::anyhow;

use super::Command;
use crate::config::ConnectionConfig;
use crate::context::SessionContext;
use crate::results::{CommandResult, ErrorResult, Outcome, ResultSet};
use crate::validation::{ConnectionConfigValidator, Validator};

/// Checks the configuration without contacting the server.
#[derive(Default)]
pub(super) struct ValidateConfig;

impl Command for ValidateConfig {
	fn execute(&self, config: &ConnectionConfig, _context: Option<&mut SessionContext>) -> anyhow::Result<CommandResult> {
		let violations = ConnectionConfigValidator.validate(config);

		let mut results = ResultSet::new();
		if violations.is_empty() {
			results.add(Arc::new(Outcome::success("The configuration is valid")));
		}
		for violation in violations {
			results.add(Arc::new(ErrorResult::new(anyhow!("{violation}"))));
		}
		Ok(CommandResult::from_results("The configuration is invalid", results))
	}
}
