//! Tags: named groups of ids resolved lazily.

use crate::container::Container;
use crate::error::DiResult;
use crate::pool::CollectionStack;
use crate::value::Value;

/// Tag name to ordered, de-duplicated ids.
#[derive(Debug, Default)]
pub struct Tags {
	tags: CollectionStack<String>,
}

impl Tags {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, tag: &str, id: &str) {
		self.tags.push_unique(tag, id.to_string());
	}

	pub fn ids(&self, tag: &str) -> Vec<String> {
		self.tags.get(tag).to_vec()
	}

	pub fn has(&self, tag: &str) -> bool {
		self.tags.has(tag)
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}

	pub fn reset(&mut self) {
		self.tags.reset();
	}
}

/// Lazily resolved members of a tag.
///
/// Each step resolves the next id through [`Container::get`]; nothing is built
/// until the iterator is advanced.
pub struct TaggedGroup {
	container: Container,
	ids: std::vec::IntoIter<String>,
}

impl TaggedGroup {
	pub(crate) fn new(container: Container, ids: Vec<String>) -> Self {
		Self {
			container,
			ids: ids.into_iter(),
		}
	}

	/// Ids not resolved yet.
	pub fn remaining(&self) -> &[String] {
		self.ids.as_slice()
	}
}

impl Iterator for TaggedGroup {
	type Item = DiResult<Value>;

	fn next(&mut self) -> Option<Self::Item> {
		let id = self.ids.next()?;
		Some(self.container.get(&id))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.ids.size_hint()
	}
}

impl ExactSizeIterator for TaggedGroup {}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_tag_keeps_order_without_duplicates() {
		// Arrange
		let mut tags = Tags::new();

		// Act
		tags.add("reports", "Cpu");
		tags.add("reports", "Memory");
		tags.add("reports", "Cpu");

		// Assert
		assert_eq!(tags.ids("reports"), vec!["Cpu", "Memory"]);
		assert!(tags.ids("missing").is_empty());
	}
}
