//! Completeness checks for connection settings.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::{ConnectionConfig, non_blank};

const MESSAGE_NULL_OR_BLANK: &str = "is null or blank";
const MESSAGE_NULL: &str = "is null";

/// A single failed check: the offending field and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Violation {
	field: String,
	message: String,
}

impl Violation {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Display for Violation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.field, self.message)
	}
}

/// Validates a value and reports every violation found.
pub trait Validator<T: ?Sized> {
	fn validate(&self, value: &T) -> BTreeSet<Violation>;
}

/// Checks that a [`ConnectionConfig`] carries everything needed to connect.
///
/// All checks run; an empty set means the configuration is usable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectionConfigValidator;

impl Validator<ConnectionConfig> for ConnectionConfigValidator {
	fn validate(&self, config: &ConnectionConfig) -> BTreeSet<Violation> {
		let mut violations = BTreeSet::new();

		if non_blank(config.host.as_deref()).is_none() {
			violations.insert(Violation::new("host", MESSAGE_NULL_OR_BLANK));
		}
		if non_blank(config.user.as_deref()).is_none() {
			violations.insert(Violation::new("user", MESSAGE_NULL_OR_BLANK));
		}
		if non_blank(config.password.as_deref()).is_none() {
			violations.insert(Violation::new("password", MESSAGE_NULL_OR_BLANK));
		}
		if config.mode.is_none() {
			violations.insert(Violation::new("connectionMode", MESSAGE_NULL));
		}
		if config.port.is_none() {
			violations.insert(Violation::new("port", MESSAGE_NULL));
		}

		violations
	}
}
