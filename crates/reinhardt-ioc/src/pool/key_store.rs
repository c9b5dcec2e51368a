//! Key to value store

use std::collections::HashMap;

/// A string-keyed store holding one value per key.
#[derive(Debug, Clone)]
pub struct KeyStore<V> {
	items: HashMap<String, V>,
}

impl<V> KeyStore<V> {
	pub fn new() -> Self {
		Self {
			items: HashMap::new(),
		}
	}

	pub fn has(&self, key: &str) -> bool {
		self.items.contains_key(key)
	}

	pub fn get(&self, key: &str) -> Option<&V> {
		self.items.get(key)
	}

	/// Stores `value` under `key`, returning the replaced value.
	pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
		self.items.insert(key.into(), value)
	}

	pub fn remove(&mut self, key: &str) -> Option<V> {
		self.items.remove(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
		self.items.iter().map(|(key, value)| (key.as_str(), value))
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn reset(&mut self) {
		self.items.clear();
	}
}

impl<V> Default for KeyStore<V> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_set_replaces_previous_value() {
		// Arrange
		let mut store = KeyStore::new();
		store.set("Shape", 1);

		// Act
		let previous = store.set("Shape", 2);

		// Assert
		assert_eq!(previous, Some(1));
		assert_eq!(store.get("Shape"), Some(&2));
		assert_eq!(store.len(), 1);
	}
}
