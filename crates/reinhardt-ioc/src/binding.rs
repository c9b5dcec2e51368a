//! Binding records stored in the container.
//!
//! An id maps to exactly one [`BindingSlot`]: either a recipe ([`Binding`]) or
//! a realized singleton ([`SharedBinding`]). Records are immutable; rebinding
//! replaces the slot wholesale.

use crate::container::Container;
use crate::error::DiResult;
use crate::value::{Arguments, Instance, Params, Value};
use std::fmt;
use std::sync::Arc;

/// Factory closure: receives the container and the current parameter overrides.
pub type Factory = Arc<dyn Fn(&Container, &Params) -> DiResult<Value> + Send + Sync>;

/// Method binding: replaces the direct invocation of `Class::method`.
pub type MethodFactory =
	Arc<dyn Fn(&Instance, Arguments, &Container) -> DiResult<Value> + Send + Sync>;

/// How a binding produces its value.
#[derive(Clone)]
pub enum Concrete {
	Factory(Factory),
	/// A class to construct (or another bound id to resolve).
	Class(String),
}

impl Concrete {
	pub fn factory<F>(factory: F) -> Self
	where
		F: Fn(&Container, &Params) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self::Factory(Arc::new(factory))
	}

	pub fn class(name: impl Into<String>) -> Self {
		Self::Class(name.into())
	}

	pub fn class_name(&self) -> Option<&str> {
		match self {
			Self::Class(name) => Some(name),
			Self::Factory(_) => None,
		}
	}

	pub fn describe(&self) -> String {
		match self {
			Self::Factory(_) => "{factory}".to_string(),
			Self::Class(name) => name.clone(),
		}
	}
}

impl fmt::Debug for Concrete {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Concrete({})", self.describe())
	}
}

impl From<&str> for Concrete {
	fn from(name: &str) -> Self {
		Self::Class(name.to_string())
	}
}

impl From<String> for Concrete {
	fn from(name: String) -> Self {
		Self::Class(name)
	}
}

/// A recipe plus its shared flag.
#[derive(Clone, Debug)]
pub struct Binding {
	concrete: Concrete,
	shared: bool,
}

impl Binding {
	pub fn new(concrete: impl Into<Concrete>, shared: bool) -> Self {
		Self {
			concrete: concrete.into(),
			shared,
		}
	}

	/// A non-shared factory binding.
	pub fn factory<F>(factory: F) -> Self
	where
		F: Fn(&Container, &Params) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self::new(Concrete::factory(factory), false)
	}

	pub fn concrete(&self) -> &Concrete {
		&self.concrete
	}

	pub fn is_shared(&self) -> bool {
		self.shared
	}
}

/// An already-resolved singleton.
///
/// When the singleton was realized from a shared [`Binding`], that binding is
/// kept as its origin so that forgetting the instance restores the recipe.
#[derive(Clone, Debug)]
pub struct SharedBinding {
	material: Value,
	origin: Option<Binding>,
}

impl SharedBinding {
	pub fn new(material: impl Into<Value>) -> Self {
		Self {
			material: material.into(),
			origin: None,
		}
	}

	pub(crate) fn promoted(material: impl Into<Value>, origin: Binding) -> Self {
		Self {
			material: material.into(),
			origin: Some(origin),
		}
	}

	/// Binding this singleton was realized from.
	pub fn origin(&self) -> Option<&Binding> {
		self.origin.as_ref()
	}

	pub fn material(&self) -> &Value {
		&self.material
	}

	pub fn into_material(self) -> Value {
		self.material
	}
}

/// Content of one store slot.
#[derive(Clone, Debug)]
pub enum BindingSlot {
	Binding(Binding),
	Shared(SharedBinding),
}

impl BindingSlot {
	pub fn is_shared(&self) -> bool {
		match self {
			Self::Binding(binding) => binding.is_shared(),
			Self::Shared(_) => true,
		}
	}
}

impl From<Binding> for BindingSlot {
	fn from(binding: Binding) -> Self {
		Self::Binding(binding)
	}
}

impl From<SharedBinding> for BindingSlot {
	fn from(shared: SharedBinding) -> Self {
		Self::Shared(shared)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_concrete_from_class_name() {
		// Arrange
		let binding = Binding::new("Circle", true);

		// Act
		let name = binding.concrete().class_name();

		// Assert
		assert_eq!(name, Some("Circle"));
		assert!(binding.is_shared());
	}

	#[rstest]
	fn test_shared_binding_slot_is_always_shared() {
		let slot = BindingSlot::from(SharedBinding::new(Value::scalar(3)));

		assert!(slot.is_shared());
		assert!(!BindingSlot::from(Binding::new("Circle", false)).is_shared());
	}

	#[rstest]
	fn test_factory_concrete_describes_itself() {
		let concrete = Concrete::factory(|_, _| Ok(Value::null()));

		assert_eq!(concrete.describe(), "{factory}");
		assert_eq!(concrete.class_name(), None);
	}
}
