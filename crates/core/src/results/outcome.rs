use std::fmt;

use super::ExecutionResult;

/// A failed operation: its cause plus an optional summary message.
#[derive(Debug)]
pub struct ErrorResult {
	message: Option<String>,
	cause: anyhow::Error,
}

impl ErrorResult {
	pub fn new(cause: impl Into<anyhow::Error>) -> Self {
		Self {
			message: None,
			cause: cause.into(),
		}
	}

	pub fn with_message(message: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
		Self {
			message: Some(message.into()),
			cause: cause.into(),
		}
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	pub fn cause(&self) -> &anyhow::Error {
		&self.cause
	}
}

impl fmt::Display for ErrorResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.message {
			Some(message) => write!(f, "{message}: {:#}", self.cause),
			None => write!(f, "{:#}", self.cause),
		}
	}
}

impl ExecutionResult for ErrorResult {
	fn error(&self) -> Option<&anyhow::Error> {
		Some(&self.cause)
	}
}

/// Outcome of a single operation: a payload or an error.
#[derive(Debug)]
pub enum Outcome<T> {
	Success(T),
	Failure(ErrorResult),
}

impl<T> Outcome<T> {
	pub fn success(value: T) -> Self {
		Outcome::Success(value)
	}

	pub fn failure(error: ErrorResult) -> Self {
		Outcome::Failure(error)
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Outcome::Failure(_))
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Outcome::Success(value) => Some(value),
			Outcome::Failure(_) => None,
		}
	}

	pub fn error_result(&self) -> Option<&ErrorResult> {
		match self {
			Outcome::Success(_) => None,
			Outcome::Failure(error) => Some(error),
		}
	}

	pub fn into_result(self) -> Result<T, ErrorResult> {
		match self {
			Outcome::Success(value) => Ok(value),
			Outcome::Failure(error) => Err(error),
		}
	}
}

impl<T, E: Into<anyhow::Error>> From<Result<T, E>> for Outcome<T> {
	fn from(result: Result<T, E>) -> Self {
		match result {
			Ok(value) => Outcome::Success(value),
			Err(err) => Outcome::Failure(ErrorResult::new(err)),
		}
	}
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Outcome::Success(value) => fmt::Display::fmt(value, f),
			Outcome::Failure(error) => fmt::Display::fmt(error, f),
		}
	}
}

impl<T: fmt::Display + Send + Sync> ExecutionResult for Outcome<T> {
	fn error(&self) -> Option<&anyhow::Error> {
		self.error_result().map(ErrorResult::cause)
	}
}
