//! Data types for the remote administration protocol.
//!
//! This crate holds the plain, serde-serializable shapes exchanged between the
//! administration client and the remote server seam: connection modes, proxy
//! settings, project descriptors and server version information.
//!
//! Types in this crate are pure data. Behavior (connecting, resolving
//! projects, looking up capabilities) lives in `fsadmin-runtime` and
//! `fsadmin`.

pub mod mode;
pub mod project;
pub mod server;

pub use mode::*;
pub use project::*;
pub use server::*;
