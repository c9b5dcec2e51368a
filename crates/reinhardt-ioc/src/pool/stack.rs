//! LIFO stack and its RAII frame guard

use parking_lot::Mutex;

/// A plain LIFO stack.
#[derive(Debug, Clone)]
pub struct Stack<T> {
	items: Vec<T>,
}

impl<T> Stack<T> {
	pub fn new() -> Self {
		Self { items: Vec::new() }
	}

	pub fn push(&mut self, item: T) {
		self.items.push(item);
	}

	/// Removes and returns the most recently pushed item.
	pub fn pull(&mut self) -> Option<T> {
		self.items.pop()
	}

	pub fn last(&self) -> Option<&T> {
		self.items.last()
	}

	pub fn last_mut(&mut self) -> Option<&mut T> {
		self.items.last_mut()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Items from the bottom of the stack to the top.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.items.iter()
	}

	pub fn as_slice(&self) -> &[T] {
		&self.items
	}

	/// Keeps only the items matching the predicate, preserving order.
	pub fn retain(&mut self, predicate: impl FnMut(&T) -> bool) {
		self.items.retain(predicate);
	}

	pub fn clear(&mut self) {
		self.items.clear();
	}
}

impl<T: PartialEq> Stack<T> {
	pub fn contains(&self, item: &T) -> bool {
		self.items.contains(item)
	}
}

impl<T> Default for Stack<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// RAII guard for one frame of a shared stack.
///
/// The frame is pushed on creation and pulled when the guard is dropped, so the
/// stack is restored on every exit path, including `?` returns.
#[derive(Debug)]
pub struct StackFrame<'a, T> {
	stack: &'a Mutex<Stack<T>>,
}

impl<'a, T> StackFrame<'a, T> {
	pub fn enter(stack: &'a Mutex<Stack<T>>, item: T) -> Self {
		stack.lock().push(item);
		Self { stack }
	}
}

impl<T> Drop for StackFrame<'_, T> {
	fn drop(&mut self) {
		self.stack.lock().pull();
	}
}
