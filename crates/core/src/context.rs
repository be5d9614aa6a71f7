//! Per-invocation session context.
//!
//! A [`SessionContext`] owns the connection for one command invocation. Opening
//! it connects to the server, resolves the configured project (creating or
//! activating it when the configuration asks for that) and fetches the
//! project-scoped capability broker. Commands then look capabilities up through
//! the context and close it when done.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fsadmin_protocol::ProjectInfo;
use fsadmin_runtime::{Capability, CapabilityBroker, CapabilityBrokerExt, CapabilityType, Connector, RemoteError};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::connection::{ConnectionBuilder, Session};
use crate::error::{Error, FailureKind, Result, SessionError};

const NO_BROKER_MESSAGE: &str = "No project broker initialized! Probably because no valid project name was configured.";

/// Lifecycle of a [`SessionContext`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
	Created,
	Connecting,
	Connected,
	ProjectResolving,
	Ready,
	Failed,
	Closed,
}

impl SessionState {
	/// Whether moving from `self` to `next` is allowed.
	pub fn can_advance_to(self, next: SessionState) -> bool {
		use SessionState::*;

		match (self, next) {
			(Created, Connecting) | (Connecting, Connected) | (Connected, ProjectResolving) | (ProjectResolving, Ready) => true,
			(Created | Connecting | Connected | ProjectResolving, Failed) => true,
			(Ready | Failed, Closed) => true,
			_ => false,
		}
	}
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SessionState::Created => "created",
			SessionState::Connecting => "connecting",
			SessionState::Connected => "connected",
			SessionState::ProjectResolving => "project-resolving",
			SessionState::Ready => "ready",
			SessionState::Failed => "failed",
			SessionState::Closed => "closed",
		})
	}
}

/// Builder for [`SessionContext`].
#[derive(Default)]
pub struct SessionContextBuilder<'a> {
	config: Option<Arc<ConnectionConfig>>,
	connector: Option<&'a dyn Connector>,
}

impl<'a> SessionContextBuilder<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn config(mut self, config: impl Into<Arc<ConnectionConfig>>) -> Self {
		self.config = Some(config.into());
		self
	}

	/// Sets the config from an optional value; `None` leaves it missing.
	pub fn maybe_config(mut self, config: Option<Arc<ConnectionConfig>>) -> Self {
		self.config = config;
		self
	}

	pub fn connector(mut self, connector: &'a dyn Connector) -> Self {
		self.connector = Some(connector);
		self
	}

	/// Connects and resolves the configured project and broker.
	///
	/// If a step after opening the connection fails, the connection is closed
	/// before the error is returned.
	pub fn open(self) -> Result<SessionContext> {
		let Some(config) = self.config else {
			return Err(Error::InvalidArgument("config is missing".to_string()));
		};
		let Some(connector) = self.connector else {
			return Err(Error::InvalidArgument("connector is missing".to_string()));
		};

		let mut context = SessionContext {
			config,
			session: None,
			project: None,
			broker: None,
			properties: BTreeMap::new(),
			state: SessionState::Created,
		};

		if let Err(err) = context.establish(connector) {
			context.fail(&err);
			return Err(err);
		}
		Ok(context)
	}
}

/// Connection, project and capability broker for one command invocation.
pub struct SessionContext {
	config: Arc<ConnectionConfig>,
	session: Option<Session>,
	project: Option<ProjectInfo>,
	broker: Option<Arc<dyn CapabilityBroker>>,
	properties: BTreeMap<String, Value>,
	state: SessionState,
}

impl SessionContext {
	pub fn builder<'a>() -> SessionContextBuilder<'a> {
		SessionContextBuilder::new()
	}

	pub fn config(&self) -> &ConnectionConfig {
		&self.config
	}

	pub fn session(&self) -> Option<&Session> {
		self.session.as_ref()
	}

	/// The resolved project, `None` when no project is configured or it does not exist.
	pub fn project(&self) -> Option<&ProjectInfo> {
		self.project.as_ref()
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn has_broker(&self) -> bool {
		self.broker.is_some()
	}

	/// Looks a capability up in the project broker.
	///
	/// Returns `None` when no broker is resolved or the broker lacks the capability.
	pub fn request_capability<T: Capability>(&self, ty: &CapabilityType<T>) -> Option<Arc<T>> {
		let Some(broker) = &self.broker else {
			warn!(
				target: "fsadmin.session",
				capability = ty.name(),
				"project broker is missing, probably because no valid project name was configured"
			);
			return None;
		};
		broker.request(ty)
	}

	/// Looks a capability up in the project broker and fails if it cannot be provided.
	pub fn require_capability<T: Capability>(&self, ty: &CapabilityType<T>) -> Result<Arc<T>> {
		let Some(broker) = &self.broker else {
			return Err(Error::illegal_state(NO_BROKER_MESSAGE));
		};
		broker.request(ty).ok_or_else(|| Error::CapabilityUnavailable(ty.name().to_string()))
	}

	pub fn property(&self, name: &str) -> Option<&Value> {
		self.properties.get(name)
	}

	/// Stores a property and returns the previous value.
	pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.properties.insert(name.into(), value.into())
	}

	pub fn remove_property(&mut self, name: &str) -> Option<Value> {
		self.properties.remove(name)
	}

	/// Property names in sorted order.
	pub fn property_names(&self) -> Vec<&str> {
		self.properties.keys().map(String::as_str).collect()
	}

	/// Releases the connection.
	pub fn close(mut self) -> Result<()> {
		debug!(target: "fsadmin.session", "closing connection");
		self.advance(SessionState::Closed);
		self.project = None;
		self.broker = None;
		match self.session.take() {
			Some(mut session) => session.close().map_err(Error::from),
			None => Ok(()),
		}
	}

	fn establish(&mut self, connector: &dyn Connector) -> Result<()> {
		self.connect(connector)?;
		self.resolve_project()?;
		self.advance(SessionState::Ready);
		Ok(())
	}

	fn connect(&mut self, connector: &dyn Connector) -> Result<()> {
		self.advance(SessionState::Connecting);

		let session = ConnectionBuilder::with(&self.config).build(connector).map_err(|err| self.classify_open(err))?;
		let session = self.session.insert(session);
		if let Err(err) = session.connect() {
			return Err(self.classify_connect(err));
		}

		self.advance(SessionState::Connected);
		Ok(())
	}

	fn resolve_project(&mut self) -> Result<()> {
		self.advance(SessionState::ProjectResolving);

		let Some(name) = self.config.project_name().map(str::to_string) else {
			info!(target: "fsadmin.session", "no project name given, so no project specific broker is required");
			return Ok(());
		};
		debug!(target: "fsadmin.session", project = %name, "requiring project specific broker");

		let Some(session) = self.session.as_ref() else {
			return Err(Error::illegal_state("connection is not open"));
		};

		let mut creation_attempted = false;
		let project = load_project(session, &self.config, &name, &mut creation_attempted).map_err(|source| {
			Error::illegal_state_with(format!("Can't load project '{name}' (creation attempted: {creation_attempted})"), source)
		})?;

		let Some(project) = project else {
			info!(target: "fsadmin.session", project = %name, "project not available, so no project specific broker is required");
			return Ok(());
		};

		let broker = resolve_broker(session, &project)?;
		info!(target: "fsadmin.session", project = %project, "project resolved");
		self.project = Some(project);
		self.broker = Some(broker);
		Ok(())
	}

	fn classify_open(&self, err: Error) -> Error {
		let kind = match err {
			Error::Configuration(_) | Error::InvalidArgument(_) => FailureKind::ConfigurationInvalid,
			_ => FailureKind::Unexpected,
		};
		SessionError::new(kind, Some(Arc::clone(&self.config)), err).into()
	}

	fn classify_connect(&self, err: RemoteError) -> Error {
		let kind = match err {
			RemoteError::SessionLimitExceeded(_) => FailureKind::SessionLimitExceeded,
			RemoteError::Authentication(_) => FailureKind::AuthenticationFailed,
			RemoteError::Io(_) => FailureKind::IoFailure,
			RemoteError::InvalidArgument(_) => FailureKind::ConfigurationInvalid,
			_ => FailureKind::Unexpected,
		};
		SessionError::new(kind, Some(Arc::clone(&self.config)), err).into()
	}

	fn advance(&mut self, next: SessionState) {
		if !self.state.can_advance_to(next) {
			warn!(target: "fsadmin.session", from = %self.state, to = %next, "ignoring invalid state transition");
			return;
		}
		debug!(target: "fsadmin.session", from = %self.state, to = %next, "state transition");
		self.state = next;
	}

	fn fail(&mut self, err: &Error) {
		warn!(target: "fsadmin.session", state = %self.state, error = %err, "session setup failed");
		self.advance(SessionState::Failed);
		self.project = None;
		self.broker = None;
		if let Some(mut session) = self.session.take() {
			if let Err(close_err) = session.close() {
				debug!(target: "fsadmin.session", error = %close_err, "closing connection after failed setup");
			}
		}
	}
}

impl Drop for SessionContext {
	fn drop(&mut self) {
		if let Some(mut session) = self.session.take() {
			warn!(target: "fsadmin.session", host = %session.host(), "session context dropped without close, releasing connection");
			if let Err(err) = session.close() {
				debug!(target: "fsadmin.session", error = %err, "failed to release connection");
			}
		}
	}
}

impl fmt::Debug for SessionContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionContext")
			.field("state", &self.state)
			.field("session", &self.session)
			.field("project", &self.project)
			.field("has_broker", &self.broker.is_some())
			.field("properties", &self.property_names())
			.finish()
	}
}

fn load_project(session: &Session, config: &ConnectionConfig, name: &str, creation_attempted: &mut bool) -> Result<Option<ProjectInfo>> {
	let mut project = session.project_by_name(name)?;

	if project.is_none() && config.create_project_if_missing {
		info!(target: "fsadmin.session", project = %name, "creating missing project on server");
		*creation_attempted = true;
		let created = session.admin()?.create_project(name, &format!("{name} created by fsadmin"))?;
		project = Some(created);
	}

	debug!(
		target: "fsadmin.session",
		activate = config.activate_project_if_deactivated,
		"activate project if deactivated"
	);
	if config.activate_project_if_deactivated {
		let Some(existing) = project.as_mut() else {
			return Err(Error::InvalidArgument("project for activation is missing".to_string()));
		};
		if existing.active {
			debug!(target: "fsadmin.session", project = %name, "project is already active");
		} else {
			warn!(target: "fsadmin.session", project = %name, "project is not active, trying to activate");
			session.admin()?.activate_project(existing)?;
			existing.active = true;
		}
	}

	Ok(project)
}

fn resolve_broker(session: &Session, project: &ProjectInfo) -> Result<Arc<dyn CapabilityBroker>> {
	let unavailable = || {
		if project.active {
			format!("Project broker is not available for project '{}'!", project.name)
		} else {
			format!("Project broker is not available for project '{}', project is deactivated!", project.name)
		}
	};

	match session.project_broker(&project.name) {
		Ok(Some(broker)) => Ok(broker),
		Ok(None) => Err(Error::illegal_state(unavailable())),
		Err(source) => Err(Error::illegal_state_with(unavailable(), source)),
	}
}

#[cfg(test)]
mod tests {
	use fsadmin_protocol::ConnectionMode;
	use fsadmin_runtime::fake::{FakeCall, FakeFailure, FakeServerBuilder};

	use super::*;

	#[derive(Debug)]
	struct StoreAgent;
	impl Capability for StoreAgent {}

	const STORE_AGENT: CapabilityType<StoreAgent> = CapabilityType::new("store-agent");

	fn config() -> ConnectionConfig {
		ConnectionConfig::new()
			.with_host("cms.example")
			.with_port(8000)
			.with_mode(ConnectionMode::Http)
			.with_user("Admin")
			.with_password("secret")
	}

	#[test]
	fn state_transitions_only_move_forward() {
		use SessionState::*;

		assert!(Created.can_advance_to(Connecting));
		assert!(ProjectResolving.can_advance_to(Ready));
		assert!(Connecting.can_advance_to(Failed));
		assert!(Ready.can_advance_to(Closed));
		assert!(Failed.can_advance_to(Closed));
		assert!(!Connected.can_advance_to(Connecting));
		assert!(!Ready.can_advance_to(Failed));
		assert!(!Closed.can_advance_to(Ready));
		assert!(!Created.can_advance_to(Closed));
	}

	#[test]
	fn without_project_context_is_ready_but_has_no_broker() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let context = SessionContext::builder().config(config()).connector(&connector).open().unwrap();

		assert_eq!(context.state(), SessionState::Ready);
		assert!(context.project().is_none());
		assert!(context.request_capability(&STORE_AGENT).is_none());
		let err = context.require_capability(&STORE_AGENT).unwrap_err();
		assert!(err.is_illegal_state());
		assert!(err.to_string().contains("No project broker initialized"));

		context.close().unwrap();
		assert_eq!(controller.open_connections(), 0);
	}

	#[test]
	fn missing_connector_is_invalid_argument() {
		let err = SessionContext::builder().config(config()).open().unwrap_err();
		assert!(matches!(err, Error::InvalidArgument(ref message) if message == "connector is missing"));
	}

	#[test]
	fn inactive_project_is_activated() {
		let (connector, controller) = FakeServerBuilder::new()
			.project(ProjectInfo::new(3, "site").with_active(false))
			.capability("site", &STORE_AGENT, Arc::new(StoreAgent))
			.build();
		let context = SessionContext::builder()
			.config(config().with_project("site"))
			.connector(&connector)
			.open()
			.unwrap();

		assert!(context.project().unwrap().active);
		assert!(controller.calls().contains(&FakeCall::ActivateProject { name: "site".into() }));
		assert!(context.require_capability(&STORE_AGENT).is_ok());
	}

	#[test]
	fn absent_project_with_activation_fails_and_closes() {
		let (connector, controller) = FakeServerBuilder::new().build();
		let err = SessionContext::builder()
			.config(config().with_project("ghost"))
			.connector(&connector)
			.open()
			.unwrap_err();

		let message = err.to_string();
		assert!(message.contains("'ghost'"), "{message}");
		assert!(message.contains("creation attempted: false"), "{message}");
		assert_eq!(controller.open_connections(), 0);
	}

	#[test]
	fn absent_project_without_activation_leaves_broker_unset() {
		let (connector, _controller) = FakeServerBuilder::new().build();
		let context = SessionContext::builder()
			.config(config().with_project("ghost").with_activate_project_if_deactivated(false))
			.connector(&connector)
			.open()
			.unwrap();
		assert_eq!(context.state(), SessionState::Ready);
		assert!(context.project().is_none());
		assert!(!context.has_broker());
	}

	#[test]
	fn failed_creation_reports_attempt() {
		let (connector, _controller) = FakeServerBuilder::new().fail_create_project(FakeFailure::Other("storage full".into())).build();
		let err = SessionContext::builder()
			.config(config().with_project("fresh").with_create_project_if_missing(true))
			.connector(&connector)
			.open()
			.unwrap_err();
		assert!(err.is_illegal_state());
		assert!(err.to_string().contains("creation attempted: true"));
	}

	#[test]
	fn broker_unavailable_for_active_project_is_generic() {
		let (connector, _controller) = FakeServerBuilder::new().project(ProjectInfo::new(1, "site")).without_broker("site").build();
		let err = SessionContext::builder()
			.config(config().with_project("site"))
			.connector(&connector)
			.open()
			.unwrap_err();
		assert_eq!(err.to_string(), "Project broker is not available for project 'site'!");
	}

	#[test]
	fn missing_capability_is_unavailable() {
		let (connector, _controller) = FakeServerBuilder::new().project(ProjectInfo::new(1, "site")).build();
		let context = SessionContext::builder()
			.config(config().with_project("site"))
			.connector(&connector)
			.open()
			.unwrap();
		assert!(context.request_capability(&STORE_AGENT).is_none());
		assert!(matches!(context.require_capability(&STORE_AGENT), Err(Error::CapabilityUnavailable(ref name)) if name == "store-agent"));
	}

	#[test]
	fn io_failure_on_connect_is_classified() {
		let (connector, controller) = FakeServerBuilder::new().fail_connect(FakeFailure::Io("connection reset".into())).build();
		let err = SessionContext::builder().config(config()).connector(&connector).open().unwrap_err();
		assert_eq!(err.failure_kind(), Some(FailureKind::IoFailure));
		assert_eq!(controller.open_connections(), 0);
	}

	#[test]
	fn unexpected_open_failure_is_fatal() {
		let (connector, _controller) = FakeServerBuilder::new().fail_open(FakeFailure::Other("driver crashed".into())).build();
		let err = SessionContext::builder().config(config()).connector(&connector).open().unwrap_err();
		assert_eq!(err.failure_kind(), Some(FailureKind::Unexpected));
		assert!(err.to_string().starts_with("Fatal error (code 305)"));
	}

	#[test]
	fn property_bag() {
		let (connector, _controller) = FakeServerBuilder::new().build();
		let mut context = SessionContext::builder().config(config()).connector(&connector).open().unwrap();

		assert_eq!(context.set_property("zeta", 1), None);
		assert_eq!(context.set_property("alpha", "first"), None);
		assert_eq!(context.set_property("alpha", "second"), Some(Value::from("first")));
		assert_eq!(context.property("alpha"), Some(&Value::from("second")));
		assert_eq!(context.property_names(), ["alpha", "zeta"]);
		assert_eq!(context.remove_property("zeta"), Some(Value::from(1)));
		assert_eq!(context.property("zeta"), None);
	}

	#[test]
	fn drop_releases_connection() {
		let (connector, controller) = FakeServerBuilder::new().build();
		{
			let _context = SessionContext::builder().config(config()).connector(&connector).open().unwrap();
			assert_eq!(controller.open_connections(), 1);
		}
		assert_eq!(controller.open_connections(), 0);
	}
}
