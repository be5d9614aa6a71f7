//! Connection traits implemented by concrete server bindings.

use std::fmt;
use std::sync::Arc;

use fsadmin_protocol::{ConnectionMode, ProjectInfo, ProxySettings, ServerVersion};

use crate::capability::{Capability, CapabilityBroker};
use crate::error::Result;

/// Everything a [`Connector`] needs to open a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectRequest {
	pub host: String,
	pub port: u16,
	pub mode: ConnectionMode,
	pub servlet_zone: String,
	pub user: String,
	pub password: String,
	/// Proxy for HTTP(S) transports. Always `None` in socket mode.
	pub proxy: Option<ProxySettings>,
}

impl ConnectRequest {
	/// Whether the transport must be encrypted.
	pub fn secure(&self) -> bool {
		self.mode.is_secure()
	}
}

impl fmt::Debug for ConnectRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectRequest")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("mode", &self.mode)
			.field("servlet_zone", &self.servlet_zone)
			.field("user", &self.user)
			.field("password", &"<redacted>")
			.field("proxy", &self.proxy)
			.finish()
	}
}

/// Factory for remote connections.
pub trait Connector {
	/// Creates a connection handle. The handle is not connected yet.
	fn open(&self, request: &ConnectRequest) -> Result<Box<dyn RemoteConnection>>;
}

/// Project storage operations of the server's admin service.
pub trait AdminService: Send + Sync {
	fn create_project(&self, name: &str, description: &str) -> Result<ProjectInfo>;

	fn activate_project(&self, project: &ProjectInfo) -> Result<()>;
}

/// A live (or connectable) session with the administration server.
pub trait RemoteConnection: Send {
	/// Establishes the session. Authentication and session quota are checked here.
	fn connect(&mut self) -> Result<()>;

	fn is_connected(&self) -> bool;

	/// Ends the session but keeps the handle reusable.
	fn disconnect(&mut self) -> Result<()>;

	/// Ends the session and releases the handle.
	fn close(&mut self) -> Result<()>;

	fn host(&self) -> &str;

	fn port(&self) -> u16;

	fn mode(&self) -> ConnectionMode;

	fn servlet_zone(&self) -> &str;

	/// Server version, when the server exposes it.
	fn server_version(&self) -> Option<ServerVersion>;

	fn projects(&self) -> Result<Vec<ProjectInfo>>;

	fn project_by_name(&self, name: &str) -> Result<Option<ProjectInfo>>;

	fn admin(&self) -> Result<Arc<dyn AdminService>>;

	/// Broker scoped to `project`. `None` when the server cannot provide one,
	/// e.g. because the project is deactivated.
	fn project_broker(&self, project: &str) -> Result<Option<Arc<dyn CapabilityBroker>>>;

	/// Server-wide service lookup by name.
	fn service(&self, name: &str) -> Result<Arc<dyn Capability>>;
}
