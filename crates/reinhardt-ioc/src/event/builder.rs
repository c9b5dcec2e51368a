//! Fluent listener registration: `container.on(kind).for_entry(id).listen_to(listener)`

use super::{BuildingEvent, DEFAULT_PRIORITY, EventKind, Listener};
use crate::container::Container;
use crate::error::{DiError, DiResult};

#[derive(Debug, Clone)]
enum Scope {
	All,
	Entry(String),
}

/// Builder returned by [`Container::on`].
#[must_use = "a listener is only registered once `listen_to` is called"]
pub struct EventListenerBuilder<'c> {
	container: &'c Container,
	kind: EventKind,
	scope: Option<Scope>,
}

impl<'c> EventListenerBuilder<'c> {
	pub(crate) fn new(container: &'c Container, kind: EventKind) -> Self {
		Self {
			container,
			kind,
			scope: None,
		}
	}

	/// Scopes the listener to one entry (aliases are resolved).
	///
	/// For Building events the entry is a parameter type and matches every
	/// parameter of that type.
	pub fn for_entry(mut self, id: impl AsRef<str>) -> Self {
		self.scope = Some(Scope::Entry(self.container.canonical_id(id.as_ref())));
		self
	}

	/// Scopes a Building listener to one parameter of one type.
	pub fn for_parameter(self, type_name: impl AsRef<str>, parameter: &str) -> DiResult<Self> {
		if self.kind != EventKind::Building {
			return Err(DiError::logical(format!(
				"{} listeners cannot be scoped to a parameter",
				self.kind
			)));
		}
		let type_name = self.container.canonical_id(type_name.as_ref());
		let parameter = parameter.trim_start_matches('$');
		Ok(Self {
			scope: Some(Scope::Entry(BuildingEvent::key_for(&type_name, parameter))),
			..self
		})
	}

	/// Fires the listener for every entry.
	pub fn for_all(mut self) -> Self {
		self.scope = Some(Scope::All);
		self
	}

	/// Registers the listener at the default priority.
	pub fn listen_to(self, listener: Listener) -> DiResult<()> {
		self.listen_to_with_priority(listener, DEFAULT_PRIORITY)
	}

	pub fn listen_to_with_priority(self, listener: Listener, priority: i32) -> DiResult<()> {
		let scope = self.scope.ok_or_else(|| {
			DiError::logical(format!(
				"for_entry(), for_parameter() or for_all() must be called before listening to {} events",
				self.kind
			))
		})?;
		if listener.kind() != self.kind {
			return Err(DiError::logical(format!(
				"a {} listener cannot listen to {} events",
				listener.kind(),
				self.kind
			)));
		}
		let entry = match scope {
			Scope::All => None,
			Scope::Entry(entry) => Some(entry),
		};
		tracing::debug!(kind = %self.kind, entry = ?entry, priority, "registering event listener");
		self.container
			.inner()
			.listeners
			.write()
			.add(listener, entry, priority);
		Ok(())
	}
}
