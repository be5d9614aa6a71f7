use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::ExecutionResult;

/// Ordered collection of results without duplicates.
///
/// Entries are compared by identity (the `Arc` they live in), not by value.
/// Adding a result that is itself a set merges that set's entries, in order,
/// as they are at the time of the call. Later changes to the added set are not
/// reflected.
#[derive(Clone, Default)]
pub struct ResultSet {
	results: Vec<Arc<dyn ExecutionResult>>,
	addresses: HashSet<usize>,
	has_error: bool,
}

impl ResultSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `result`, or the entries of `result` if it is a set.
	///
	/// Results already contained are skipped. Nested sets are walked once
	/// each, so sets that refer to each other cannot loop.
	pub fn add(&mut self, result: Arc<dyn ExecutionResult>) {
		let mut visited = HashSet::new();
		self.add_tracked(&result, &mut visited);
	}

	pub fn add_all<I>(&mut self, results: I)
	where
		I: IntoIterator<Item = Arc<dyn ExecutionResult>>,
	{
		let mut visited = HashSet::new();
		for result in results {
			self.add_tracked(&result, &mut visited);
		}
	}

	/// Whether an error result is contained, directly or through a merged set.
	pub fn has_error(&self) -> bool {
		self.has_error
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Arc<dyn ExecutionResult>> {
		self.results.get(index)
	}

	/// Whether this exact result (by identity) is contained.
	pub fn contains(&self, result: &Arc<dyn ExecutionResult>) -> bool {
		self.addresses.contains(&address_of(result))
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn ExecutionResult>> {
		self.results.iter()
	}

	/// Causes of all contained error results, in order.
	pub fn errors(&self) -> impl Iterator<Item = &anyhow::Error> {
		self.results.iter().filter_map(|result| result.error())
	}

	fn add_tracked(&mut self, result: &Arc<dyn ExecutionResult>, visited: &mut HashSet<usize>) {
		let address = address_of(result);
		if address == std::ptr::from_ref(self).addr() || !visited.insert(address) {
			return;
		}

		if let Some(nested) = result.as_result_set() {
			let nested_address = std::ptr::from_ref(nested).addr();
			if nested_address != address && !visited.insert(nested_address) {
				return;
			}
			for entry in &nested.results {
				self.add_tracked(entry, visited);
			}
			return;
		}

		if !self.addresses.insert(address) {
			return;
		}
		if result.is_error() {
			self.has_error = true;
		}
		self.results.push(Arc::clone(result));
	}
}

fn address_of(result: &Arc<dyn ExecutionResult>) -> usize {
	Arc::as_ptr(result).cast::<()>().addr()
}

impl<'a> IntoIterator for &'a ResultSet {
	type Item = &'a Arc<dyn ExecutionResult>;
	type IntoIter = std::slice::Iter<'a, Arc<dyn ExecutionResult>>;

	fn into_iter(self) -> Self::IntoIter {
		self.results.iter()
	}
}

impl FromIterator<Arc<dyn ExecutionResult>> for ResultSet {
	fn from_iter<I: IntoIterator<Item = Arc<dyn ExecutionResult>>>(iter: I) -> Self {
		let mut set = ResultSet::new();
		set.add_all(iter);
		set
	}
}

impl fmt::Display for ResultSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, result) in self.results.iter().enumerate() {
			if index > 0 {
				writeln!(f)?;
			}
			write!(f, "{result}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for ResultSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.results.iter().map(ToString::to_string)).finish()
	}
}

impl ExecutionResult for ResultSet {
	/// First contained error.
	fn error(&self) -> Option<&anyhow::Error> {
		self.errors().next()
	}

	fn is_error(&self) -> bool {
		self.has_error
	}

	fn as_result_set(&self) -> Option<&ResultSet> {
		Some(self)
	}
}
