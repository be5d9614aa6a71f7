//! Transport modes and proxy settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default port used by the HTTP and HTTPS modes.
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default port used by the socket mode.
pub const DEFAULT_SOCKET_PORT: u16 = 1088;

/// Default port of an HTTP proxy when only the host is configured.
pub const DEFAULT_PROXY_PORT: u16 = 8080;

/// Transport used to reach the administration server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionMode {
	#[default]
	Http,
	Https,
	Socket,
}

impl ConnectionMode {
	/// Port used when none is configured explicitly.
	pub fn default_port(self) -> u16 {
		match self {
			ConnectionMode::Http | ConnectionMode::Https => DEFAULT_HTTP_PORT,
			ConnectionMode::Socket => DEFAULT_SOCKET_PORT,
		}
	}

	/// Whether the mode tunnels through HTTP and can therefore use a proxy.
	pub fn is_http(self) -> bool {
		matches!(self, ConnectionMode::Http | ConnectionMode::Https)
	}

	/// Whether the transport is encrypted.
	pub fn is_secure(self) -> bool {
		self == ConnectionMode::Https
	}
}

impl FromStr for ConnectionMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"HTTP" => Ok(ConnectionMode::Http),
			"HTTPS" => Ok(ConnectionMode::Https),
			"SOCKET" => Ok(ConnectionMode::Socket),
			_ => Err(format!("unknown connection mode: {s}")),
		}
	}
}

impl fmt::Display for ConnectionMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionMode::Http => write!(f, "HTTP"),
			ConnectionMode::Https => write!(f, "HTTPS"),
			ConnectionMode::Socket => write!(f, "SOCKET"),
		}
	}
}

/// HTTP(S) proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
	pub host: String,
	pub port: u16,
}

impl ProxySettings {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self { host: host.into(), port }
	}
}

impl fmt::Display for ProxySettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.host, self.port)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_ports_follow_mode() {
		assert_eq!(ConnectionMode::Http.default_port(), 8000);
		assert_eq!(ConnectionMode::Https.default_port(), 8000);
		assert_eq!(ConnectionMode::Socket.default_port(), 1088);
	}

	#[test]
	fn parses_case_insensitively() {
		assert_eq!("https".parse::<ConnectionMode>(), Ok(ConnectionMode::Https));
		assert_eq!(" Socket ".parse::<ConnectionMode>(), Ok(ConnectionMode::Socket));
		assert!("ftp".parse::<ConnectionMode>().is_err());
	}

	#[test]
	fn only_http_modes_accept_proxies() {
		assert!(ConnectionMode::Http.is_http());
		assert!(ConnectionMode::Https.is_http());
		assert!(!ConnectionMode::Socket.is_http());
		assert!(ConnectionMode::Https.is_secure());
		assert!(!ConnectionMode::Http.is_secure());
	}

	#[test]
	fn serializes_as_uppercase_name() {
		let json = serde_json::to_string(&ConnectionMode::Socket).unwrap();
		assert_eq!(json, "\"SOCKET\"");
		let mode: ConnectionMode = serde_json::from_str("\"HTTPS\"").unwrap();
		assert_eq!(mode, ConnectionMode::Https);
	}
}
