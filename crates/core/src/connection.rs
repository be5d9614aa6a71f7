//! Building and driving the connection to the administration server.

use std::sync::Arc;

use fsadmin_protocol::{ConnectionMode, ProjectInfo, ServerVersion};
use fsadmin_runtime::{AdminService, Capability, CapabilityBroker, CapabilityType, ConnectRequest, Connector, RemoteConnection, RemoteError};
use tracing::{debug, info};

use crate::config::{ConnectionConfig, non_blank};
use crate::error::{Error, Result};
use crate::validation::{ConnectionConfigValidator, Validator};

/// Turns a validated [`ConnectionConfig`] into an unconnected [`Session`].
pub struct ConnectionBuilder<'a> {
	config: &'a ConnectionConfig,
}

impl<'a> ConnectionBuilder<'a> {
	pub fn with(config: &'a ConnectionConfig) -> Self {
		Self { config }
	}

	/// Validates the configuration and opens a connection handle through `connector`.
	///
	/// The returned session is not connected yet; call [`Session::connect`].
	pub fn build(&self, connector: &dyn Connector) -> Result<Session> {
		let request = self.request()?;

		debug!(
			target: "fsadmin.connection",
			host = %request.host,
			port = request.port,
			user = %request.user,
			mode = %request.mode,
			secure = request.secure(),
			"opening connection"
		);
		if let Some(proxy) = &request.proxy {
			info!(target: "fsadmin.connection", proxy = %proxy, "using http proxy");
		}

		let connection = connector.open(&request).map_err(|err| match err {
			RemoteError::InvalidArgument(message) => Error::Configuration(message),
			other => Error::Remote(other),
		})?;
		Ok(Session { connection })
	}

	fn request(&self) -> Result<ConnectRequest> {
		let violations = ConnectionConfigValidator.validate(self.config);
		if !violations.is_empty() {
			let mut message = String::from("The configuration is invalid:");
			for violation in &violations {
				message.push('\n');
				message.push_str(&violation.to_string());
			}
			return Err(Error::Configuration(message));
		}

		// The validator guarantees these are present and non-blank.
		let (Some(host), Some(port), Some(mode), Some(user), Some(password)) = (
			non_blank(self.config.host.as_deref()),
			self.config.port,
			self.config.mode,
			non_blank(self.config.user.as_deref()),
			non_blank(self.config.password.as_deref()),
		) else {
			return Err(Error::Configuration("The configuration is invalid".to_string()));
		};

		let proxy = match mode {
			ConnectionMode::Http | ConnectionMode::Https => self.config.proxy(),
			ConnectionMode::Socket => None,
		};

		Ok(ConnectRequest {
			host: host.to_string(),
			port,
			mode,
			servlet_zone: self.config.servlet_zone().to_string(),
			user: user.to_string(),
			password: password.to_string(),
			proxy,
		})
	}
}

/// A connection to the administration server.
pub struct Session {
	connection: Box<dyn RemoteConnection>,
}

impl Session {
	/// Establishes the session and logs the server version if the server reports one.
	pub fn connect(&mut self) -> fsadmin_runtime::Result<()> {
		self.connection.connect()?;
		match self.connection.server_version() {
			Some(version) => info!(
				target: "fsadmin.connection",
				host = %self.connection.host(),
				version = %version.full_version,
				mode = %version.mode,
				"connected"
			),
			None => debug!(target: "fsadmin.connection", host = %self.connection.host(), "connected, server version unknown"),
		}
		Ok(())
	}

	pub fn is_connected(&self) -> bool {
		self.connection.is_connected()
	}

	pub fn disconnect(&mut self) -> fsadmin_runtime::Result<()> {
		self.connection.disconnect()
	}

	pub fn close(&mut self) -> fsadmin_runtime::Result<()> {
		self.connection.close()
	}

	pub fn host(&self) -> &str {
		self.connection.host()
	}

	pub fn port(&self) -> u16 {
		self.connection.port()
	}

	pub fn mode(&self) -> ConnectionMode {
		self.connection.mode()
	}

	pub fn servlet_zone(&self) -> &str {
		self.connection.servlet_zone()
	}

	pub fn server_version(&self) -> Option<ServerVersion> {
		self.connection.server_version()
	}

	pub fn projects(&self) -> fsadmin_runtime::Result<Vec<ProjectInfo>> {
		self.connection.projects()
	}

	pub fn project_by_name(&self, name: &str) -> fsadmin_runtime::Result<Option<ProjectInfo>> {
		self.connection.project_by_name(name)
	}

	pub fn admin(&self) -> fsadmin_runtime::Result<Arc<dyn AdminService>> {
		self.connection.admin()
	}

	pub fn project_broker(&self, project: &str) -> fsadmin_runtime::Result<Option<Arc<dyn CapabilityBroker>>> {
		self.connection.project_broker(project)
	}

	pub fn service(&self, name: &str) -> fsadmin_runtime::Result<Arc<dyn Capability>> {
		self.connection.service(name)
	}

	/// Typed server-wide service lookup.
	pub fn typed_service<T: Capability>(&self, ty: &CapabilityType<T>) -> Result<Arc<T>> {
		let service = self.connection.service(ty.name())?;
		service
			.downcast_arc::<T>()
			.map_err(|_| Error::CapabilityUnavailable(format!("service '{}' has an unexpected type", ty.name())))
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("host", &self.connection.host())
			.field("port", &self.connection.port())
			.field("mode", &self.connection.mode())
			.field("connected", &self.connection.is_connected())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use fsadmin_protocol::{ProxySettings, ServerMode};
	use fsadmin_runtime::fake::{FakeCall, FakeFailure, FakeServerBuilder};

	use super::*;
	use crate::logging::capture::capture;

	fn config(mode: ConnectionMode) -> ConnectionConfig {
		ConnectionConfig::new()
			.with_host("cms.example")
			.with_port(mode.default_port())
			.with_mode(mode)
			.with_user("Admin")
			.with_password("secret")
	}

	#[test]
	fn invalid_config_lists_every_violation() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let err = ConnectionBuilder::with(&ConnectionConfig::new().with_host("cms.example")).build(&connector).unwrap_err();

		let message = match err {
			Error::Configuration(message) => message,
			other => panic!("expected configuration error, got {other:?}"),
		};
		assert_eq!(
			message,
			"The configuration is invalid:\nconnectionMode is null\npassword is null or blank\nport is null\nuser is null or blank"
		);
		assert!(controller.calls().is_empty());
	}

	#[test]
	fn https_is_secure_and_keeps_proxy() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let config = config(ConnectionMode::Https).with_proxy("proxy.local", None);
		ConnectionBuilder::with(&config).build(&connector).unwrap();

		let request = controller.last_request().unwrap();
		assert!(request.secure());
		assert_eq!(request.proxy, Some(ProxySettings::new("proxy.local", 8080)));
		assert_eq!(request.servlet_zone, "/");
	}

	#[test]
	fn http_proxy_is_announced_at_info() {
		let (connector, _controller) = FakeServerBuilder::new().build();
		let config = config(ConnectionMode::Http).with_proxy("proxy.local", Some(3128));

		let events = capture("fsadmin.connection=info", || {
			ConnectionBuilder::with(&config).build(&connector).unwrap();
		});

		let proxy = events.iter().find(|event| event.message == "using http proxy").expect("proxy event");
		assert_eq!(proxy.level, tracing::Level::INFO);
		assert_eq!(proxy.target, "fsadmin.connection");
		assert!(events.iter().all(|event| event.message != "opening connection"));
	}

	#[test]
	fn socket_mode_ignores_proxy() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let config = config(ConnectionMode::Socket).with_proxy("proxy.local", Some(3128));
		ConnectionBuilder::with(&config).build(&connector).unwrap();

		let calls = controller.calls();
		assert!(matches!(&calls[0], FakeCall::Open { secure: false, proxy: None, .. }));
	}

	#[test]
	fn blank_proxy_host_is_ignored() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let config = config(ConnectionMode::Http).with_proxy("  ", Some(3128));
		ConnectionBuilder::with(&config).build(&connector).unwrap();
		assert_eq!(controller.last_request().unwrap().proxy, None);
	}

	#[test]
	fn remote_invalid_argument_is_a_configuration_error() {
		let (connector, _controller) = FakeServerBuilder::new().fail_open(FakeFailure::InvalidArgument("bad zone".into())).build();
		let err = ConnectionBuilder::with(&config(ConnectionMode::Http)).build(&connector).unwrap_err();
		assert!(matches!(err, Error::Configuration(ref message) if message == "bad zone"));
	}

	#[test]
	fn session_passes_through_to_connection() {
		let (connector, _controller) = FakeServerBuilder::new()
			.server_version(ServerVersion::new("5.2.2104", ServerMode::Production))
			.project(ProjectInfo::new(1, "site"))
			.build();
		let mut session = ConnectionBuilder::with(&config(ConnectionMode::Http)).build(&connector).unwrap();
		assert!(!session.is_connected());
		assert!(session.server_version().is_none());

		session.connect().unwrap();
		assert!(session.is_connected());
		assert_eq!(session.host(), "cms.example");
		assert_eq!(session.port(), 8000);
		assert_eq!(session.server_version().unwrap().full_version, "5.2.2104");
		assert_eq!(session.projects().unwrap().len(), 1);
		assert!(session.project_by_name("missing").unwrap().is_none());

		session.disconnect().unwrap();
		assert!(!session.is_connected());
	}
}
