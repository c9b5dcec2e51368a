//! Building event: fired while one typed constructor parameter is resolved

use super::BuildingListener;
use crate::binding::BindingSlot;
use crate::container::Container;
use crate::error::DiResult;

/// Event fired while a typed parameter is resolved.
///
/// The event key is `"{Type}:{parameter}"`. A listener supplies the value by
/// calling [`BuildingEvent::set_binding`] with either a deferred
/// [`Binding`](crate::Binding) (built on demand, not cached) or a
/// [`SharedBinding`](crate::SharedBinding) (cached under the event key). When
/// no listener sets a binding, resolution falls through to contextual
/// bindings and auto-wiring.
pub struct BuildingEvent<'c> {
	container: &'c Container,
	key: String,
	type_name: String,
	parameter: String,
	consumer: String,
	binding: Option<BindingSlot>,
	stopped: bool,
}

impl<'c> BuildingEvent<'c> {
	pub(crate) fn new(
		container: &'c Container,
		type_name: &str,
		parameter: &str,
		consumer: &str,
	) -> Self {
		Self {
			container,
			key: Self::key_for(type_name, parameter),
			type_name: type_name.to_string(),
			parameter: parameter.to_string(),
			consumer: consumer.to_string(),
			binding: None,
			stopped: false,
		}
	}

	/// Event key for a parameter: `"{Type}:{parameter}"`.
	pub fn key_for(type_name: &str, parameter: &str) -> String {
		format!("{type_name}:{parameter}")
	}

	pub fn container(&self) -> &'c Container {
		self.container
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Declared type of the parameter.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Parameter name, without the `$` marker.
	pub fn parameter(&self) -> &str {
		&self.parameter
	}

	/// Class or method whose parameter is being resolved.
	pub fn consumer(&self) -> &str {
		&self.consumer
	}

	/// Supplies the parameter value.
	pub fn set_binding(&mut self, binding: impl Into<BindingSlot>) {
		self.binding = Some(binding.into());
	}

	pub fn binding(&self) -> Option<&BindingSlot> {
		self.binding.as_ref()
	}

	/// Prevents listeners that have not run yet from running.
	pub fn stop_propagation(&mut self) {
		self.stopped = true;
	}

	pub fn is_propagation_stopped(&self) -> bool {
		self.stopped
	}

	pub(crate) fn dispatch(&mut self, listeners: &[BuildingListener]) -> DiResult<()> {
		for listener in listeners {
			if self.stopped {
				break;
			}
			listener(&mut *self)?;
		}
		Ok(())
	}

	pub(crate) fn into_binding(self) -> Option<BindingSlot> {
		self.binding
	}
}
