//! Opaque capabilities and the brokers that hand them out.
//!
//! A capability is any vendor service handle (admin service, store agent,
//! schedule agent, ...). The client never inspects them; it names the one it
//! wants with a [`CapabilityType`] token and receives a typed `Arc<T>` back.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use tracing::debug;

use crate::error::{RemoteError, Result};

/// Marker for values a broker can hand out.
pub trait Capability: DowncastSync {}
impl_downcast!(sync Capability);

/// Typed, opaque name of a capability.
pub struct CapabilityType<T> {
	name: &'static str,
	_marker: PhantomData<fn() -> T>,
}

impl<T> CapabilityType<T> {
	pub const fn new(name: &'static str) -> Self {
		Self { name, _marker: PhantomData }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl<T> Clone for CapabilityType<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for CapabilityType<T> {}

impl<T> fmt::Debug for CapabilityType<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("CapabilityType").field(&self.name).finish()
	}
}

impl<T> fmt::Display for CapabilityType<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Registry of capabilities, usually scoped to one project.
pub trait CapabilityBroker: Send + Sync {
	/// Returns the capability registered under `name`, if any.
	fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>>;
}

/// Typed lookups on top of [`CapabilityBroker::lookup`].
pub trait CapabilityBrokerExt {
	/// Returns the capability, or `None` when it is absent or has another type.
	fn request<T: Capability>(&self, ty: &CapabilityType<T>) -> Option<Arc<T>>;

	/// Returns the capability or fails with [`RemoteError::CapabilityNotFound`].
	fn require<T: Capability>(&self, ty: &CapabilityType<T>) -> Result<Arc<T>>;
}

impl<B: CapabilityBroker + ?Sized> CapabilityBrokerExt for B {
	fn request<T: Capability>(&self, ty: &CapabilityType<T>) -> Option<Arc<T>> {
		let capability = self.lookup(ty.name())?;
		match capability.downcast_arc::<T>() {
			Ok(typed) => Some(typed),
			Err(_) => {
				debug!(target: "fsadmin.broker", capability = ty.name(), "capability registered with a different type");
				None
			}
		}
	}

	fn require<T: Capability>(&self, ty: &CapabilityType<T>) -> Result<Arc<T>> {
		self.request(ty).ok_or_else(|| RemoteError::CapabilityNotFound(ty.name().to_string()))
	}
}

/// Simple name-keyed broker.
#[derive(Default, Clone)]
pub struct CapabilityMap {
	entries: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `capability` under the token's name, replacing any previous entry.
	pub fn insert<T: Capability>(&mut self, ty: &CapabilityType<T>, capability: Arc<T>) {
		self.entries.insert(ty.name().to_string(), capability);
	}

	/// Registers an already type-erased capability.
	pub fn insert_raw(&mut self, name: impl Into<String>, capability: Arc<dyn Capability>) {
		self.entries.insert(name.into(), capability);
	}

	pub fn with<T: Capability>(mut self, ty: &CapabilityType<T>, capability: Arc<T>) -> Self {
		self.insert(ty, capability);
		self
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl CapabilityBroker for CapabilityMap {
	fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>> {
		self.entries.get(name).cloned()
	}
}

impl fmt::Debug for CapabilityMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
		names.sort_unstable();
		f.debug_struct("CapabilityMap").field("capabilities", &names).finish()
	}
}
