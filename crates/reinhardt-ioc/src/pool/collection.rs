//! Key to ordered collection store

use super::stack::Stack;
use std::collections::HashMap;

/// A string-keyed store holding an ordered collection per key.
///
/// Each key owns its own [`Stack`]; items keep insertion order.
#[derive(Debug, Clone)]
pub struct CollectionStack<V> {
	items: HashMap<String, Stack<V>>,
}

impl<V> CollectionStack<V> {
	pub fn new() -> Self {
		Self {
			items: HashMap::new(),
		}
	}

	/// Appends `value` to the collection stored under `key`.
	pub fn push(&mut self, key: impl Into<String>, value: V) {
		self.items.entry(key.into()).or_default().push(value);
	}

	/// Items stored under `key`, oldest first.
	pub fn get(&self, key: &str) -> &[V] {
		self.items.get(key).map(Stack::as_slice).unwrap_or(&[])
	}

	pub fn has(&self, key: &str) -> bool {
		self.items.get(key).is_some_and(|stack| !stack.is_empty())
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

impl<V: PartialEq> CollectionStack<V> {
	/// Appends `value` unless the collection already holds it.
	pub fn push_unique(&mut self, key: impl Into<String>, value: V) {
		let stack = self.items.entry(key.into()).or_default();
		if !stack.contains(&value) {
			stack.push(value);
		}
	}

	/// Removes `value` from the collection stored under `key`.
	///
	/// Empty collections are dropped.
	pub fn remove_item(&mut self, key: &str, value: &V) {
		let Some(stack) = self.items.get_mut(key) else {
			return;
		};
		stack.retain(|item| item != value);
		if stack.is_empty() {
			self.items.remove(key);
		}
	}
}

impl<V> Default for CollectionStack<V> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_push_keeps_insertion_order() {
		// Arrange
		let mut tags = CollectionStack::new();

		// Act
		tags.push("reports", "Cpu".to_string());
		tags.push("reports", "Memory".to_string());

		// Assert
		assert_eq!(tags.get("reports"), ["Cpu", "Memory"]);
		assert!(tags.get("missing").is_empty());
	}

	#[rstest]
	fn test_push_unique_and_remove_item() {
		// Arrange
		let mut aliases = CollectionStack::new();
		aliases.push_unique("Circle", "shape".to_string());
		aliases.push_unique("Circle", "shape".to_string());
		aliases.push_unique("Circle", "round".to_string());

		// Act
		aliases.remove_item("Circle", &"shape".to_string());

		// Assert
		assert_eq!(aliases.get("Circle"), ["round"]);

		// Act: removing the last item drops the key
		aliases.remove_item("Circle", &"round".to_string());

		// Assert
		assert!(!aliases.has("Circle"));
		assert!(aliases.is_empty());
	}
}
