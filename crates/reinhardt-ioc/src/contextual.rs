//! Contextual bindings: dependency overrides scoped to one consumer.
//!
//! ```
//! use reinhardt_ioc::{Container, Value};
//!
//! let container = Container::new();
//! container
//!     .when("ReportController")
//!     .needs("$title")
//!     .give_value(Value::scalar("Quarterly"))
//!     .unwrap();
//! ```

use crate::binding::Factory;
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::value::{Params, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a contextual binding provides.
#[derive(Clone)]
pub enum Give {
	/// Resolve this id through the container.
	Class(String),
	/// Call this factory with the container and the current parameters.
	Factory(Factory),
	/// Inject this value as is.
	Value(Value),
}

impl Give {
	pub(crate) fn materialize(&self, container: &Container) -> DiResult<Value> {
		match self {
			Self::Class(id) => container.get(id),
			Self::Factory(factory) => factory(container, &container.current_params()),
			Self::Value(value) => Ok(value.clone()),
		}
	}
}

impl fmt::Debug for Give {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(id) => write!(f, "Give::Class({id})"),
			Self::Factory(_) => f.write_str("Give::Factory"),
			Self::Value(value) => write!(f, "Give::Value({value:?})"),
		}
	}
}

/// Store of `(consumer, need) -> Give`.
///
/// `need` is a type name, or a parameter name prefixed with `$`.
#[derive(Debug, Default)]
pub struct ContextualBindings {
	bindings: HashMap<String, HashMap<String, Give>>,
}

impl ContextualBindings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, consumer: impl Into<String>, need: impl Into<String>, give: Give) {
		self.bindings
			.entry(consumer.into())
			.or_default()
			.insert(need.into(), give);
	}

	pub fn get(&self, consumer: &str, need: &str) -> Option<&Give> {
		self.bindings.get(consumer)?.get(need)
	}

	/// First binding found for `need` across `consumers`, in order.
	pub fn find<'a>(&self, consumers: impl IntoIterator<Item = &'a str>, need: &str) -> Option<Give> {
		consumers
			.into_iter()
			.find_map(|consumer| self.get(consumer, need))
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.bindings.values().map(HashMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn reset(&mut self) {
		self.bindings.clear();
	}
}

/// Builder returned by [`Container::when`].
#[must_use = "a contextual binding is only stored once `give` is called"]
pub struct ContextualBindingBuilder<'c> {
	container: &'c Container,
	consumers: Vec<String>,
	need: Option<String>,
}

impl<'c> ContextualBindingBuilder<'c> {
	pub(crate) fn new(container: &'c Container, consumers: Vec<String>) -> Self {
		Self {
			container,
			consumers,
			need: None,
		}
	}

	/// Dependency to override: a type name or `$parameter`.
	pub fn needs(mut self, need: impl Into<String>) -> Self {
		self.need = Some(need.into());
		self
	}

	/// Stores the binding for every consumer.
	pub fn give(self, give: Give) -> DiResult<()> {
		let need = self.need.ok_or_else(|| {
			DiError::logical("needs() must be called before give() on a contextual binding")
		})?;
		let need = if need.starts_with('$') {
			need
		} else {
			self.container.canonical_id(&need)
		};
		for consumer in &self.consumers {
			let consumer = self.container.canonical_id(consumer);
			tracing::debug!(consumer = %consumer, need = %need, give = ?give, "adding contextual binding");
			self.container
				.inner()
				.contextual
				.write()
				.add(consumer, need.clone(), give.clone());
		}
		Ok(())
	}

	pub fn give_class(self, class: impl Into<String>) -> DiResult<()> {
		self.give(Give::Class(class.into()))
	}

	pub fn give_factory<F>(self, factory: F) -> DiResult<()>
	where
		F: Fn(&Container, &Params) -> DiResult<Value> + Send + Sync + 'static,
	{
		self.give(Give::Factory(Arc::new(factory)))
	}

	pub fn give_value(self, value: impl Into<Value>) -> DiResult<()> {
		self.give(Give::Value(value.into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_find_checks_consumers_in_order() {
		// Arrange
		let mut store = ContextualBindings::new();
		store.add("Report", "Logger", Give::Class("FileLogger".into()));
		store.add("ReportAlias", "Logger", Give::Class("NullLogger".into()));

		// Act
		let found = store.find(["Missing", "ReportAlias", "Report"], "Logger");

		// Assert
		assert!(matches!(found, Some(Give::Class(ref class)) if class == "NullLogger"));
	}

	#[rstest]
	fn test_bindings_are_scoped_to_the_consumer() {
		let mut store = ContextualBindings::new();
		store.add("Report", "$title", Give::Value(Value::scalar("Q1")));

		assert!(store.get("Report", "$title").is_some());
		assert!(store.get("Invoice", "$title").is_none());
		assert_eq!(store.len(), 1);
	}
}
