//! Connection configuration.
//!
//! A [`ConnectionConfig`] is assembled from explicit values (builder methods or
//! a JSON file), then optionally completed from environment variables and
//! defaults. Every connection field stays optional so validation can report
//! what is missing instead of failing on the first gap.

use std::fmt;
use std::path::Path;

use fsadmin_protocol::{ConnectionMode, DEFAULT_PROXY_PORT, ProxySettings};
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_USER: &str = "Admin";
pub const DEFAULT_SERVLET_ZONE: &str = "/";

pub const ENV_HOST: &str = "fshost";
pub const ENV_PORT: &str = "fsport";
pub const ENV_MODE: &str = "fsmode";
pub const ENV_USER: &str = "fsuser";
pub const ENV_PASSWORD: &str = "fspwd";
pub const ENV_PROJECT: &str = "fsproject";
pub const ENV_SERVLET_ZONE: &str = "fsservletzone";
pub const ENV_PROXY_HOST: &str = "fshttpproxyhost";
pub const ENV_PROXY_PORT: &str = "fshttpproxyport";

/// Settings for one administration session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
	pub host: Option<String>,
	pub port: Option<u16>,
	#[serde(rename = "connectionMode")]
	pub mode: Option<ConnectionMode>,
	pub http_proxy_host: Option<String>,
	pub http_proxy_port: Option<u16>,
	pub servlet_zone: Option<String>,
	pub user: Option<String>,
	pub password: Option<String>,
	pub project: Option<String>,
	pub activate_project_if_deactivated: bool,
	pub create_project_if_missing: bool,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self {
			host: None,
			port: None,
			mode: None,
			http_proxy_host: None,
			http_proxy_port: None,
			servlet_zone: None,
			user: None,
			password: None,
			project: None,
			activate_project_if_deactivated: true,
			create_project_if_missing: false,
		}
	}
}

impl ConnectionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads a JSON configuration file (camelCase keys).
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigLoad {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Fills fields that are still unset from `fs*` environment variables.
	///
	/// Values are trimmed. Explicitly configured fields are never overridden.
	pub fn apply_env<I, K, V>(mut self, vars: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		for (key, value) in vars {
			let key = key.as_ref();
			let value = value.as_ref().trim();
			match key {
				ENV_HOST => fill_blank(&mut self.host, value),
				ENV_USER => fill_blank(&mut self.user, value),
				ENV_PASSWORD => fill_blank(&mut self.password, value),
				ENV_PROJECT => fill_blank(&mut self.project, value),
				ENV_PROXY_HOST => fill_blank(&mut self.http_proxy_host, value),
				ENV_SERVLET_ZONE if self.servlet_zone.is_none() => self.servlet_zone = Some(value.to_string()),
				ENV_PORT if self.port.is_none() => self.port = Some(parse_env(key, value)?),
				ENV_PROXY_PORT if self.http_proxy_port.is_none() => self.http_proxy_port = Some(parse_env(key, value)?),
				ENV_MODE if self.mode.is_none() => {
					self.mode = Some(value.parse().map_err(|_| Error::InvalidEnvValue {
						key: key.to_string(),
						value: value.to_string(),
					})?);
				}
				_ => {}
			}
		}
		Ok(self)
	}

	/// [`apply_env`](Self::apply_env) with the variables of the current process.
	pub fn apply_process_env(self) -> Result<Self> {
		self.apply_env(std::env::vars())
	}

	/// Completes unset connection fields with the client defaults.
	pub fn with_defaults(mut self) -> Self {
		fill_blank(&mut self.host, DEFAULT_HOST);
		fill_blank(&mut self.user, DEFAULT_USER);
		fill_blank(&mut self.password, DEFAULT_USER);
		let mode = *self.mode.get_or_insert(ConnectionMode::Http);
		self.port.get_or_insert(mode.default_port());
		self.servlet_zone.get_or_insert_with(|| DEFAULT_SERVLET_ZONE.to_string());
		self
	}

	pub fn with_host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());
		self
	}

	pub fn with_port(mut self, port: u16) -> Self {
		self.port = Some(port);
		self
	}

	pub fn with_mode(mut self, mode: ConnectionMode) -> Self {
		self.mode = Some(mode);
		self
	}

	pub fn with_proxy(mut self, host: impl Into<String>, port: Option<u16>) -> Self {
		self.http_proxy_host = Some(host.into());
		self.http_proxy_port = port;
		self
	}

	pub fn with_servlet_zone(mut self, zone: impl Into<String>) -> Self {
		self.servlet_zone = Some(zone.into());
		self
	}

	pub fn with_user(mut self, user: impl Into<String>) -> Self {
		self.user = Some(user.into());
		self
	}

	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(password.into());
		self
	}

	pub fn with_project(mut self, project: impl Into<String>) -> Self {
		self.project = Some(project.into());
		self
	}

	pub fn with_activate_project_if_deactivated(mut self, activate: bool) -> Self {
		self.activate_project_if_deactivated = activate;
		self
	}

	pub fn with_create_project_if_missing(mut self, create: bool) -> Self {
		self.create_project_if_missing = create;
		self
	}

	/// Configured project name, `None` when unset or blank.
	pub fn project_name(&self) -> Option<&str> {
		non_blank(self.project.as_deref())
	}

	/// Proxy settings, `None` when no proxy host is configured.
	pub fn proxy(&self) -> Option<ProxySettings> {
		let host = non_blank(self.http_proxy_host.as_deref())?;
		Some(ProxySettings::new(host, self.http_proxy_port.unwrap_or(DEFAULT_PROXY_PORT)))
	}

	/// Servlet zone, falling back to the root zone.
	pub fn servlet_zone(&self) -> &str {
		self.servlet_zone.as_deref().unwrap_or(DEFAULT_SERVLET_ZONE)
	}
}

impl fmt::Debug for ConnectionConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionConfig")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("mode", &self.mode)
			.field("http_proxy_host", &self.http_proxy_host)
			.field("http_proxy_port", &self.http_proxy_port)
			.field("servlet_zone", &self.servlet_zone)
			.field("user", &self.user)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.field("project", &self.project)
			.field("activate_project_if_deactivated", &self.activate_project_if_deactivated)
			.field("create_project_if_missing", &self.create_project_if_missing)
			.finish()
	}
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}

fn fill_blank(slot: &mut Option<String>, value: &str) {
	if non_blank(slot.as_deref()).is_none() && !value.is_empty() {
		*slot = Some(value.to_string());
	}
}

fn parse_env(key: &str, value: &str) -> Result<u16> {
	value.parse().map_err(|_| Error::InvalidEnvValue {
		key: key.to_string(),
		value: value.to_string(),
	})
}
