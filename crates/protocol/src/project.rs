use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of a project as reported by the remote server.
///
/// The client never owns the project; it keeps this descriptor and the
/// activation flag it observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
	pub id: u64,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub active: bool,
}

impl ProjectInfo {
	pub fn new(id: u64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			description: None,
			active: true,
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_active(mut self, active: bool) -> Self {
		self.active = active;
		self
	}
}

impl fmt::Display for ProjectInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (id={}", self.name, self.id)?;
		if !self.active {
			write!(f, ", deactivated")?;
		}
		write!(f, ")")
	}
}
