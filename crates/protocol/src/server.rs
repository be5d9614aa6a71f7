use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating mode reported alongside the server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
	Production,
	Development,
	Unknown,
}

impl fmt::Display for ServerMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ServerMode::Production => write!(f, "production"),
			ServerMode::Development => write!(f, "development"),
			ServerMode::Unknown => write!(f, "unknown"),
		}
	}
}

/// Version information a server may expose after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerVersion {
	pub full_version: String,
	pub mode: ServerMode,
}

impl ServerVersion {
	pub fn new(full_version: impl Into<String>, mode: ServerMode) -> Self {
		Self {
			full_version: full_version.into(),
			mode,
		}
	}
}

impl fmt::Display for ServerVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.full_version, self.mode)
	}
}
