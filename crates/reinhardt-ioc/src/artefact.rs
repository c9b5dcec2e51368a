//! Build stack tracking.
//!
//! The artefact is the ordered list of classes currently under construction.
//! It renders the "while building [A, B]" error context, names the current
//! consumer for contextual lookups, and detects construction cycles before
//! they recurse without bound.
//!
//! Frames are RAII guards: the stack is restored on every exit path,
//! including early `?` returns from a failed build.

use crate::error::{DiError, DiResult};
use crate::pool::{Stack, StackFrame};
use parking_lot::Mutex;

/// Ordered trace of the classes being constructed.
#[derive(Debug, Default)]
pub struct Artefact {
	stack: Mutex<Stack<String>>,
}

/// Guard for one artefact frame; pulls the frame on drop.
#[derive(Debug)]
#[must_use = "the frame is pulled as soon as the guard is dropped"]
pub struct ArtefactFrame<'a> {
	_frame: StackFrame<'a, String>,
}

impl Artefact {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pushes `class`, failing if it is already under construction.
	pub fn enter(&self, class: &str) -> DiResult<ArtefactFrame<'_>> {
		{
			let stack = self.stack.lock();
			if let Some(start) = stack.iter().position(|entry| entry == class) {
				let path = stack.as_slice()[start..]
					.iter()
					.map(String::as_str)
					.chain(std::iter::once(class))
					.collect::<Vec<_>>()
					.join(" -> ");
				return Err(DiError::CircularDependency {
					class: class.to_string(),
					path,
				});
			}
		}
		Ok(self.enter_unchecked(class))
	}

	/// Pushes `id` without the cycle check.
	pub fn enter_unchecked(&self, id: &str) -> ArtefactFrame<'_> {
		tracing::trace!(artefact = %id, "entering artefact frame");
		ArtefactFrame {
			_frame: StackFrame::enter(&self.stack, id.to_string()),
		}
	}

	/// Class currently being built.
	pub fn current(&self) -> Option<String> {
		self.stack.lock().last().cloned()
	}

	/// Snapshot of the stack, outermost first.
	pub fn trail(&self) -> Vec<String> {
		self.stack.lock().as_slice().to_vec()
	}

	pub fn len(&self) -> usize {
		self.stack.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.stack.lock().is_empty()
	}

	pub(crate) fn clear(&self) {
		self.stack.lock().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_frames_are_pulled_on_drop() {
		// Arrange
		let artefact = Artefact::new();

		// Act
		{
			let _outer = artefact.enter("A").unwrap();
			let _inner = artefact.enter("B").unwrap();
			assert_eq!(artefact.trail(), vec!["A", "B"]);
			assert_eq!(artefact.current().as_deref(), Some("B"));
		}

		// Assert
		assert!(artefact.is_empty());
	}

	#[rstest]
	fn test_reentering_a_class_reports_the_cycle() {
		// Arrange
		let artefact = Artefact::new();
		let _a = artefact.enter("A").unwrap();
		let _b = artefact.enter("B").unwrap();

		// Act
		let result = artefact.enter("A");

		// Assert
		match result {
			Err(DiError::CircularDependency { class, path }) => {
				assert_eq!(class, "A");
				assert_eq!(path, "A -> B -> A");
			}
			other => panic!("expected a circular dependency, got {other:?}"),
		}
		assert_eq!(artefact.len(), 2);
	}

	#[rstest]
	fn test_failed_build_still_restores_the_stack() {
		// Arrange
		let artefact = Artefact::new();
		let build = |artefact: &Artefact| -> DiResult<()> {
			let _frame = artefact.enter("A")?;
			Err(DiError::logical("boom"))
		};

		// Act
		let result = build(&artefact);

		// Assert
		assert!(result.is_err());
		assert!(artefact.is_empty());
	}

	#[rstest]
	fn test_unchecked_frames_allow_repeated_ids() {
		let artefact = Artefact::new();
		let _a = artefact.enter("A").unwrap();

		let _again = artefact.enter_unchecked("A");

		assert_eq!(artefact.trail(), vec!["A", "A"]);
	}
}
