//! In-memory administration server for tests.
//!
//! Provides a [`Connector`] backed by shared state so tests can run the full
//! session lifecycle without a real server, inject failures, and inspect the
//! calls the client made.
//!
//! # Example
//!
//! ```ignore
//! let (connector, controller) = FakeServerBuilder::new()
//!     .project(ProjectInfo::new(1, "website"))
//!     .build();
//!
//! let mut connection = connector.open(&request)?;
//! connection.connect()?;
//! assert_eq!(controller.open_connections(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fsadmin_protocol::{ConnectionMode, ProjectInfo, ProxySettings, ServerVersion};
use parking_lot::Mutex;

use crate::capability::{Capability, CapabilityBroker, CapabilityMap, CapabilityType};
use crate::connection::{AdminService, ConnectRequest, Connector, RemoteConnection};
use crate::error::{RemoteError, Result};

/// Failure a fake server can be told to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFailure {
	SessionLimit,
	Authentication,
	Io(String),
	InvalidArgument(String),
	Other(String),
}

impl FakeFailure {
	fn to_error(&self) -> RemoteError {
		match self {
			FakeFailure::SessionLimit => RemoteError::SessionLimitExceeded("session quota reached".to_string()),
			FakeFailure::Authentication => RemoteError::Authentication("invalid credentials".to_string()),
			FakeFailure::Io(message) => RemoteError::Io(std::io::Error::other(message.clone())),
			FakeFailure::InvalidArgument(message) => RemoteError::InvalidArgument(message.clone()),
			FakeFailure::Other(message) => RemoteError::Other(message.clone()),
		}
	}
}

/// A call observed by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
	Open {
		host: String,
		port: u16,
		mode: ConnectionMode,
		secure: bool,
		proxy: Option<ProxySettings>,
	},
	Connect,
	Disconnect,
	Close,
	CreateProject {
		name: String,
		description: String,
	},
	ActivateProject {
		name: String,
	},
	ProjectBroker {
		name: String,
	},
}

#[derive(Default)]
struct FakeState {
	projects: Vec<ProjectInfo>,
	next_project_id: u64,
	brokers: HashMap<String, CapabilityMap>,
	brokerless: HashSet<String>,
	services: HashMap<String, Arc<dyn Capability>>,
	version: Option<ServerVersion>,
	open_failure: Option<FakeFailure>,
	connect_failure: Option<FakeFailure>,
	create_failure: Option<FakeFailure>,
	activate_failure: Option<FakeFailure>,
	calls: Vec<FakeCall>,
	last_request: Option<ConnectRequest>,
	open_connections: usize,
}

impl FakeState {
	fn find_project(&self, name: &str) -> Option<&ProjectInfo> {
		self.projects.iter().find(|project| project.name == name)
	}
}

type SharedState = Arc<Mutex<FakeState>>;

/// Builder for a fake server and its controller.
pub struct FakeServerBuilder {
	state: FakeState,
}

impl FakeServerBuilder {
	pub fn new() -> Self {
		Self {
			state: FakeState {
				next_project_id: 1,
				..FakeState::default()
			},
		}
	}

	/// Adds an existing project.
	pub fn project(mut self, project: ProjectInfo) -> Self {
		self.state.next_project_id = self.state.next_project_id.max(project.id + 1);
		self.state.projects.push(project);
		self
	}

	/// Registers a capability in the broker of `project`.
	pub fn capability<T: Capability>(mut self, project: &str, ty: &CapabilityType<T>, capability: Arc<T>) -> Self {
		self.state.brokers.entry(project.to_string()).or_default().insert(ty, capability);
		self
	}

	/// Makes the broker agent return nothing for `project` even when it is active.
	pub fn without_broker(mut self, project: &str) -> Self {
		self.state.brokerless.insert(project.to_string());
		self
	}

	/// Registers a server-wide service.
	pub fn service<T: Capability>(mut self, ty: &CapabilityType<T>, service: Arc<T>) -> Self {
		self.state.services.insert(ty.name().to_string(), service);
		self
	}

	pub fn server_version(mut self, version: ServerVersion) -> Self {
		self.state.version = Some(version);
		self
	}

	/// Fails [`Connector::open`].
	pub fn fail_open(mut self, failure: FakeFailure) -> Self {
		self.state.open_failure = Some(failure);
		self
	}

	/// Fails [`RemoteConnection::connect`].
	pub fn fail_connect(mut self, failure: FakeFailure) -> Self {
		self.state.connect_failure = Some(failure);
		self
	}

	pub fn fail_create_project(mut self, failure: FakeFailure) -> Self {
		self.state.create_failure = Some(failure);
		self
	}

	pub fn fail_activate_project(mut self, failure: FakeFailure) -> Self {
		self.state.activate_failure = Some(failure);
		self
	}

	/// Builds the connector and a controller sharing the same state.
	pub fn build(self) -> (FakeConnector, FakeServerController) {
		let state = Arc::new(Mutex::new(self.state));
		(FakeConnector { state: Arc::clone(&state) }, FakeServerController { state })
	}
}

impl Default for FakeServerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Inspection handle for a fake server.
#[derive(Clone)]
pub struct FakeServerController {
	state: SharedState,
}

impl FakeServerController {
	/// All calls observed so far.
	pub fn calls(&self) -> Vec<FakeCall> {
		self.state.lock().calls.clone()
	}

	/// Takes all observed calls, clearing the buffer.
	pub fn take_calls(&self) -> Vec<FakeCall> {
		std::mem::take(&mut self.state.lock().calls)
	}

	/// Number of connections opened and not yet closed.
	pub fn open_connections(&self) -> usize {
		self.state.lock().open_connections
	}

	pub fn last_request(&self) -> Option<ConnectRequest> {
		self.state.lock().last_request.clone()
	}

	pub fn project(&self, name: &str) -> Option<ProjectInfo> {
		self.state.lock().find_project(name).cloned()
	}
}

/// [`Connector`] backed by the fake server state.
#[derive(Clone)]
pub struct FakeConnector {
	state: SharedState,
}

impl Connector for FakeConnector {
	fn open(&self, request: &ConnectRequest) -> Result<Box<dyn RemoteConnection>> {
		let mut state = self.state.lock();
		state.calls.push(FakeCall::Open {
			host: request.host.clone(),
			port: request.port,
			mode: request.mode,
			secure: request.secure(),
			proxy: request.proxy.clone(),
		});
		state.last_request = Some(request.clone());
		if let Some(failure) = &state.open_failure {
			return Err(failure.to_error());
		}
		state.open_connections += 1;

		Ok(Box::new(FakeConnection {
			state: Arc::clone(&self.state),
			host: request.host.clone(),
			port: request.port,
			mode: request.mode,
			servlet_zone: request.servlet_zone.clone(),
			connected: false,
			closed: false,
		}))
	}
}

struct FakeConnection {
	state: SharedState,
	host: String,
	port: u16,
	mode: ConnectionMode,
	servlet_zone: String,
	connected: bool,
	closed: bool,
}

impl FakeConnection {
	fn ensure_connected(&self) -> Result<()> {
		if self.closed {
			return Err(RemoteError::Closed);
		}
		if !self.connected {
			return Err(RemoteError::NotConnected);
		}
		Ok(())
	}
}

impl RemoteConnection for FakeConnection {
	fn connect(&mut self) -> Result<()> {
		if self.closed {
			return Err(RemoteError::Closed);
		}
		let mut state = self.state.lock();
		state.calls.push(FakeCall::Connect);
		if let Some(failure) = &state.connect_failure {
			return Err(failure.to_error());
		}
		self.connected = true;
		Ok(())
	}

	fn is_connected(&self) -> bool {
		self.connected
	}

	fn disconnect(&mut self) -> Result<()> {
		self.ensure_connected()?;
		self.state.lock().calls.push(FakeCall::Disconnect);
		self.connected = false;
		Ok(())
	}

	fn close(&mut self) -> Result<()> {
		if self.closed {
			return Err(RemoteError::Closed);
		}
		let mut state = self.state.lock();
		state.calls.push(FakeCall::Close);
		state.open_connections = state.open_connections.saturating_sub(1);
		self.connected = false;
		self.closed = true;
		Ok(())
	}

	fn host(&self) -> &str {
		&self.host
	}

	fn port(&self) -> u16 {
		self.port
	}

	fn mode(&self) -> ConnectionMode {
		self.mode
	}

	fn servlet_zone(&self) -> &str {
		&self.servlet_zone
	}

	fn server_version(&self) -> Option<ServerVersion> {
		if !self.connected {
			return None;
		}
		self.state.lock().version.clone()
	}

	fn projects(&self) -> Result<Vec<ProjectInfo>> {
		self.ensure_connected()?;
		Ok(self.state.lock().projects.clone())
	}

	fn project_by_name(&self, name: &str) -> Result<Option<ProjectInfo>> {
		self.ensure_connected()?;
		Ok(self.state.lock().find_project(name).cloned())
	}

	fn admin(&self) -> Result<Arc<dyn AdminService>> {
		self.ensure_connected()?;
		Ok(Arc::new(FakeAdminService {
			state: Arc::clone(&self.state),
		}))
	}

	fn project_broker(&self, project: &str) -> Result<Option<Arc<dyn CapabilityBroker>>> {
		self.ensure_connected()?;
		let mut state = self.state.lock();
		state.calls.push(FakeCall::ProjectBroker { name: project.to_string() });

		let available = state.find_project(project).is_some_and(|info| info.active) && !state.brokerless.contains(project);
		if !available {
			return Ok(None);
		}
		let broker = state.brokers.get(project).cloned().unwrap_or_default();
		Ok(Some(Arc::new(broker)))
	}

	fn service(&self, name: &str) -> Result<Arc<dyn Capability>> {
		self.ensure_connected()?;
		self.state
			.lock()
			.services
			.get(name)
			.cloned()
			.ok_or_else(|| RemoteError::ServiceNotFound(name.to_string()))
	}
}

struct FakeAdminService {
	state: SharedState,
}

impl AdminService for FakeAdminService {
	fn create_project(&self, name: &str, description: &str) -> Result<ProjectInfo> {
		let mut state = self.state.lock();
		state.calls.push(FakeCall::CreateProject {
			name: name.to_string(),
			description: description.to_string(),
		});
		if let Some(failure) = &state.create_failure {
			return Err(failure.to_error());
		}
		if state.find_project(name).is_some() {
			return Err(RemoteError::InvalidArgument(format!("project '{name}' already exists")));
		}

		let project = ProjectInfo::new(state.next_project_id, name).with_description(description);
		state.next_project_id += 1;
		state.projects.push(project.clone());
		Ok(project)
	}

	fn activate_project(&self, project: &ProjectInfo) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(FakeCall::ActivateProject { name: project.name.clone() });
		if let Some(failure) = &state.activate_failure {
			return Err(failure.to_error());
		}
		let stored = state
			.projects
			.iter_mut()
			.find(|stored| stored.id == project.id)
			.ok_or_else(|| RemoteError::InvalidArgument(format!("unknown project '{}'", project.name)))?;
		stored.active = true;
		Ok(())
	}
}
