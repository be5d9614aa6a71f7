//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn",
		1 => "info",
		_ => "debug",
	}
}

/// Installs a fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity`. Calling this more than once
/// keeps the first subscriber.
pub fn init_logging(verbosity: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.try_init();
}


#[cfg(test)]
mod tests {
	use fsadmin_protocol::ConnectionMode;
	use fsadmin_runtime::fake::FakeServerBuilder;

	use super::capture::capture;
	use super::*;
	use crate::config::ConnectionConfig;
	use crate::context::SessionContext;

	#[test]
	fn verbosity_raises_level() {
		assert_eq!(default_directive(0), "warn");
		assert_eq!(default_directive(1), "info");
		assert_eq!(default_directive(2), "debug");
		assert_eq!(default_directive(9), "debug");
	}

	#[test]
	fn init_is_idempotent() {
		init_logging(2);
		init_logging(0);
		tracing::debug!(target: "fsadmin.session", "logging initialized twice");
	}

	#[test]
	fn session_events_are_filtered_by_their_target() {
		let (connector, _controller) = FakeServerBuilder::new().build();
		let config = ConnectionConfig::new()
			.with_host("cms.example")
			.with_mode(ConnectionMode::Http)
			.with_user("editor")
			.with_password("pw")
			.with_defaults();

		let events = capture("fsadmin.session=debug", || {
			let context = SessionContext::builder().config(config).connector(&connector).open().unwrap();
			context.close().unwrap();
		});

		assert!(!events.is_empty());
		assert!(events.iter().all(|event| event.target == "fsadmin.session"), "{events:?}");
		assert!(events.iter().any(|event| event.message == "state transition"));
		assert!(events.iter().any(|event| event.message == "closing connection"));
	}

	#[test]
	fn module_path_directives_do_not_match_named_targets() {
		let (connector, _controller) = FakeServerBuilder::new().build();
		let config = ConnectionConfig::new()
			.with_host("cms.example")
			.with_mode(ConnectionMode::Socket)
			.with_user("editor")
			.with_password("pw")
			.with_defaults();

		let events = capture("fsadmin::context=debug,fsadmin::connection=debug", || {
			let context = SessionContext::builder().config(config).connector(&connector).open().unwrap();
			context.close().unwrap();
		});
		assert!(events.is_empty(), "{events:?}");
	}
}
