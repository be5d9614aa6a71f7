//! Failure taxonomy and the crate error type.
//!
//! [`FailureKind`] is the closed set of ways opening a session can fail. Each
//! kind has a [`Severity`] and a stable numeric code. [`SessionError`] pairs a
//! kind with the configuration that was in use so its message can name the
//! server and user involved.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use fsadmin_runtime::RemoteError;
use thiserror::Error;

use crate::config::ConnectionConfig;

/// How bad a failure is. Determines the hundreds digit of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Minor,
	Major,
	Fatal,
}

impl Severity {
	pub fn base_code(self) -> u16 {
		match self {
			Severity::Minor => 100,
			Severity::Major => 200,
			Severity::Fatal => 300,
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Severity::Minor => "Minor",
			Severity::Major => "Major",
			Severity::Fatal => "Fatal",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
	SessionLimitExceeded,
	AuthenticationFailed,
	IoFailure,
	ConfigurationInvalid,
	Unexpected,
}

impl FailureKind {
	/// All kinds, in code order.
	pub const ALL: [FailureKind; 5] = [
		FailureKind::SessionLimitExceeded,
		FailureKind::AuthenticationFailed,
		FailureKind::IoFailure,
		FailureKind::ConfigurationInvalid,
		FailureKind::Unexpected,
	];

	pub fn severity(self) -> Severity {
		match self {
			FailureKind::SessionLimitExceeded | FailureKind::IoFailure | FailureKind::ConfigurationInvalid => Severity::Minor,
			FailureKind::AuthenticationFailed => Severity::Major,
			FailureKind::Unexpected => Severity::Fatal,
		}
	}

	/// Zero-based position in [`FailureKind::ALL`].
	pub fn ordinal(self) -> u16 {
		match self {
			FailureKind::SessionLimitExceeded => 0,
			FailureKind::AuthenticationFailed => 1,
			FailureKind::IoFailure => 2,
			FailureKind::ConfigurationInvalid => 3,
			FailureKind::Unexpected => 4,
		}
	}

	/// Stable error code: severity base plus ordinal plus one.
	pub fn code(self) -> u16 {
		self.severity().base_code() + self.ordinal() + 1
	}

	/// Message body without the severity prefix.
	///
	/// With a configuration the host, port, mode and user are interpolated.
	/// The password is never part of the message.
	pub fn describe(self, config: Option<&ConnectionConfig>) -> String {
		let Some(config) = config else {
			return self.generic_message().to_string();
		};

		let host = config.host.as_deref().unwrap_or(UNSET);
		let port = config.port.map_or_else(|| UNSET.to_string(), |port| port.to_string());
		let mode = config.mode.map_or_else(|| UNSET.to_string(), |mode| mode.to_string());
		let user = config.user.as_deref().unwrap_or(UNSET);

		match self {
			FailureKind::SessionLimitExceeded => {
				format!("maximum number of sessions exceeded on {host}:{port} ({mode}), retry later or close other sessions")
			}
			FailureKind::AuthenticationFailed => format!("authentication of user '{user}' failed on {host}:{port} ({mode})"),
			FailureKind::IoFailure => format!("I/O error while talking to {host}:{port} ({mode}), check host, port and connection mode"),
			FailureKind::ConfigurationInvalid => format!("configuration for {host}:{port} ({mode}) with user '{user}' is invalid"),
			FailureKind::Unexpected => format!("unexpected error while connecting to {host}:{port} ({mode}) as '{user}'"),
		}
	}

	fn generic_message(self) -> &'static str {
		match self {
			FailureKind::SessionLimitExceeded => "maximum number of sessions exceeded",
			FailureKind::AuthenticationFailed => "authentication failed",
			FailureKind::IoFailure => "I/O error while talking to the server",
			FailureKind::ConfigurationInvalid => "configuration is invalid",
			FailureKind::Unexpected => "unexpected error",
		}
	}
}

impl fmt::Display for FailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} error (code {})", self.severity(), self.code())
	}
}

const UNSET: &str = "<unset>";

/// A classified failure while opening a session.
#[derive(Debug)]
pub struct SessionError {
	kind: FailureKind,
	config: Option<Arc<ConnectionConfig>>,
	source: anyhow::Error,
}

impl SessionError {
	pub fn new(kind: FailureKind, config: Option<Arc<ConnectionConfig>>, source: impl Into<anyhow::Error>) -> Self {
		Self {
			kind,
			config,
			source: source.into(),
		}
	}

	pub fn kind(&self) -> FailureKind {
		self.kind
	}

	pub fn code(&self) -> u16 {
		self.kind.code()
	}

	pub fn config(&self) -> Option<&ConnectionConfig> {
		self.config.as_deref()
	}

	/// The underlying cause.
	pub fn cause(&self) -> &anyhow::Error {
		&self.source
	}
}

impl fmt::Display for SessionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind, self.kind.describe(self.config()))
	}
}

impl std::error::Error for SessionError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		let source: &(dyn std::error::Error + Send + Sync + 'static) = self.source.as_ref();
		Some(source)
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Session(#[from] SessionError),

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("{0}")]
	Configuration(String),

	#[error("{message}")]
	IllegalState {
		message: String,
		#[source]
		source: Option<Box<dyn std::error::Error + Send + Sync>>,
	},

	#[error("capability not available: {0}")]
	CapabilityUnavailable(String),

	#[error("failed to read config file {path}: {source}")]
	ConfigLoad {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid value '{value}' for environment variable {key}")]
	InvalidEnvValue { key: String, value: String },

	#[error(transparent)]
	Remote(#[from] RemoteError),
}

impl Error {
	pub fn illegal_state(message: impl Into<String>) -> Self {
		Self::IllegalState {
			message: message.into(),
			source: None,
		}
	}

	pub fn illegal_state_with(message: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self::IllegalState {
			message: message.into(),
			source: Some(source.into()),
		}
	}

	/// Failure kind, for errors raised while opening a session.
	pub fn failure_kind(&self) -> Option<FailureKind> {
		match self {
			Error::Session(err) => Some(err.kind()),
			_ => None,
		}
	}

	pub fn is_illegal_state(&self) -> bool {
		matches!(self, Error::IllegalState { .. })
	}
}

pub type Result<T> = std::result::Result<T, Error>;
