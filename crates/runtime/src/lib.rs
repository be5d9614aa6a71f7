//! Remote server seam for the administration client.
//!
//! Everything the client needs from the vendor side goes through the traits
//! in this crate: a [`Connector`] opens a [`RemoteConnection`], which exposes
//! project lookup, an [`AdminService`] for project storage operations, and
//! project-scoped [`CapabilityBroker`]s. Capabilities are opaque and are
//! resolved through typed [`CapabilityType`] tokens.
//!
//! The [`fake`] module provides an in-memory server used by tests.

pub mod capability;
pub mod connection;
pub mod error;
pub mod fake;

pub use capability::{Capability, CapabilityBroker, CapabilityBrokerExt, CapabilityMap, CapabilityType};
pub use connection::{AdminService, ConnectRequest, Connector, RemoteConnection};
pub use error::{RemoteError, Result};
