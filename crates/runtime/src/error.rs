use thiserror::Error;

/// Failures reported by the remote server or its transport.
#[derive(Debug, Error)]
pub enum RemoteError {
	#[error("maximum number of sessions exceeded: {0}")]
	SessionLimitExceeded(String),

	#[error("authentication failed: {0}")]
	Authentication(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("service not found: {0}")]
	ServiceNotFound(String),

	#[error("capability not available: {0}")]
	CapabilityNotFound(String),

	#[error("connection is not connected")]
	NotConnected,

	#[error("connection already closed")]
	Closed,

	#[error("{0}")]
	Other(String),
}

impl RemoteError {
	pub fn is_authentication(&self) -> bool {
		matches!(self, RemoteError::Authentication(_))
	}
}

pub type Result<T> = std::result::Result<T, RemoteError>;
