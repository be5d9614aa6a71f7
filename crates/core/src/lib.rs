//! Core of the `fsadmin` administration client.
//!
//! A command invocation runs through these pieces:
//!
//! - [`ConnectionConfig`] describes the server and project to use.
//! - [`ConnectionConfigValidator`] reports what the configuration lacks.
//! - [`ConnectionBuilder`] turns a valid configuration into a [`Session`].
//! - [`SessionContext`] connects, resolves the project and its capability
//!   broker, and hands capabilities to command code.
//! - [`results`] collects what the command did into a [`CommandResult`].
//!
//! Failures while opening a session are classified by [`FailureKind`].

pub mod commands;
pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod logging;
pub mod results;
pub mod validation;

pub use commands::{CATALOG, Command, CommandSpec, command_names, execute, lookup_command};
pub use config::ConnectionConfig;
pub use connection::{ConnectionBuilder, Session};
pub use context::{SessionContext, SessionContextBuilder, SessionState};
pub use error::{Error, FailureKind, Result, SessionError, Severity};
pub use results::{CommandFailure, CommandResult, ErrorResult, ExecutionResult, Outcome, ResultSet};
pub use validation::{ConnectionConfigValidator, Validator, Violation};
