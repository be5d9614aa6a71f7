//! Static command table.

use super::Command;
use super::config::ValidateConfig;
use super::project::{ProjectInfoCommand, ProjectList};
use super::server::{ServerInfo, TestConnection};

/// Registration of one command.
pub struct CommandSpec {
	/// Primary dotted name, e.g. `project.list`.
	pub name: &'static str,
	pub aliases: &'static [&'static str],
	/// Whether [`execute`](super::execute) opens a session context for the command.
	pub needs_context: bool,
	pub factory: fn() -> Box<dyn Command>,
}

impl CommandSpec {
	pub fn matches(&self, name: &str) -> bool {
		self.name == name || self.aliases.iter().any(|alias| *alias == name)
	}
}

impl std::fmt::Debug for CommandSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandSpec")
			.field("name", &self.name)
			.field("aliases", &self.aliases)
			.field("needs_context", &self.needs_context)
			.finish_non_exhaustive()
	}
}

pub static CATALOG: &[CommandSpec] = &[
	CommandSpec {
		name: "test.connection",
		aliases: &["test"],
		needs_context: true,
		factory: boxed::<TestConnection>,
	},
	CommandSpec {
		name: "server.info",
		aliases: &[],
		needs_context: true,
		factory: boxed::<ServerInfo>,
	},
	CommandSpec {
		name: "project.list",
		aliases: &["projects"],
		needs_context: true,
		factory: boxed::<ProjectList>,
	},
	CommandSpec {
		name: "project.info",
		aliases: &[],
		needs_context: true,
		factory: boxed::<ProjectInfoCommand>,
	},
	CommandSpec {
		name: "config.validate",
		aliases: &[],
		needs_context: false,
		factory: boxed::<ValidateConfig>,
	},
];

fn boxed<C: Command + Default + 'static>() -> Box<dyn Command> {
	Box::new(C::default())
}

/// Finds a command by primary name or alias.
pub fn lookup_command(name: &str) -> Option<&'static CommandSpec> {
	CATALOG.iter().find(|spec| spec.matches(name))
}

/// Primary names of all registered commands, in registration order.
pub fn command_names() -> impl Iterator<Item = &'static str> {
	CATALOG.iter().map(|spec| spec.name)
}
