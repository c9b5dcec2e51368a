//! AfterBuild event: fired once an object is fully constructed

use super::{AfterBuildListener, DEFAULT_PRIORITY};
use crate::container::Container;
use crate::error::DiResult;
use crate::value::Instance;
use std::fmt;
use std::sync::Arc;

/// Callable decorator: receives the current object and returns its replacement.
pub type DecoratorFn = Arc<dyn Fn(Instance, &Container) -> DiResult<Instance> + Send + Sync>;

/// Updater: mutates the current object in place (through interior mutability).
pub type UpdaterFn = Arc<dyn Fn(&Instance, &Container) -> DiResult<()> + Send + Sync>;

/// Something that wraps or replaces a freshly built object.
#[derive(Clone)]
pub enum Decorator {
	/// A closure returning the replacement object.
	Callable(DecoratorFn),
	/// A class whose first constructor parameter receives the current object.
	Class(String),
}

impl Decorator {
	pub fn callable<F>(decorator: F) -> Self
	where
		F: Fn(Instance, &Container) -> DiResult<Instance> + Send + Sync + 'static,
	{
		Self::Callable(Arc::new(decorator))
	}

	pub fn class(name: impl Into<String>) -> Self {
		Self::Class(name.into())
	}

	/// Short description used in logs and errors.
	pub fn describe(&self) -> String {
		match self {
			Self::Callable(_) => "{closure}".to_string(),
			Self::Class(name) => name.clone(),
		}
	}
}

impl fmt::Debug for Decorator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Decorator({})", self.describe())
	}
}

impl From<&str> for Decorator {
	fn from(name: &str) -> Self {
		Self::Class(name.to_string())
	}
}

impl From<String> for Decorator {
	fn from(name: String) -> Self {
		Self::Class(name)
	}
}

/// Event fired after an entry has been built.
///
/// Listeners register decorators (applied in ascending priority, each one
/// wrapping the previous result) and updaters (applied afterwards, in
/// ascending priority, to the final decorated object).
pub struct AfterBuildEvent<'c> {
	container: &'c Container,
	id: String,
	resolved: Instance,
	decorators: Vec<(i32, Decorator)>,
	updaters: Vec<(i32, UpdaterFn)>,
	stopped: bool,
}

impl<'c> AfterBuildEvent<'c> {
	pub(crate) fn new(container: &'c Container, id: impl Into<String>, resolved: Instance) -> Self {
		Self {
			container,
			id: id.into(),
			resolved,
			decorators: Vec::new(),
			updaters: Vec::new(),
			stopped: false,
		}
	}

	pub fn container(&self) -> &'c Container {
		self.container
	}

	/// Entry that was built.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// The object as built, before any decoration.
	pub fn resolved(&self) -> &Instance {
		&self.resolved
	}

	/// Registers a decorator at the default priority.
	pub fn decorate(&mut self, decorator: impl Into<Decorator>) {
		self.decorate_with(decorator, DEFAULT_PRIORITY);
	}

	pub fn decorate_with(&mut self, decorator: impl Into<Decorator>, priority: i32) {
		self.decorators.push((priority, decorator.into()));
	}

	/// Registers an updater at the default priority.
	pub fn update<F>(&mut self, updater: F)
	where
		F: Fn(&Instance, &Container) -> DiResult<()> + Send + Sync + 'static,
	{
		self.update_with(updater, DEFAULT_PRIORITY);
	}

	pub fn update_with<F>(&mut self, updater: F, priority: i32)
	where
		F: Fn(&Instance, &Container) -> DiResult<()> + Send + Sync + 'static,
	{
		self.updaters.push((priority, Arc::new(updater)));
	}

	pub fn decorator_count(&self) -> usize {
		self.decorators.len()
	}

	pub fn updater_count(&self) -> usize {
		self.updaters.len()
	}

	/// Prevents listeners that have not run yet from running.
	pub fn stop_propagation(&mut self) {
		self.stopped = true;
	}

	pub fn is_propagation_stopped(&self) -> bool {
		self.stopped
	}

	pub(crate) fn dispatch(&mut self, listeners: &[AfterBuildListener]) -> DiResult<()> {
		for listener in listeners {
			if self.stopped {
				break;
			}
			listener(&mut *self)?;
		}
		Ok(())
	}

	/// Decorators and updaters, each sorted by ascending priority.
	///
	/// The sort is stable: equal priorities keep registration order.
	pub(crate) fn into_pipeline(self) -> (Instance, Vec<Decorator>, Vec<UpdaterFn>) {
		let Self {
			resolved,
			mut decorators,
			mut updaters,
			..
		} = self;
		decorators.sort_by_key(|(priority, _)| *priority);
		updaters.sort_by_key(|(priority, _)| *priority);
		(
			resolved,
			decorators.into_iter().map(|(_, decorator)| decorator).collect(),
			updaters.into_iter().map(|(_, updater)| updater).collect(),
		)
	}
}
