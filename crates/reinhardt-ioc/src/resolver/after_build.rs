//! Decoration pipeline run on freshly built objects

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::event::{AfterBuildEvent, Decorator};
use crate::value::{Instance, Params};

pub(crate) struct AfterBuildHandler<'c> {
	container: &'c Container,
}

impl<'c> AfterBuildHandler<'c> {
	pub(crate) fn new(container: &'c Container) -> Self {
		Self { container }
	}

	/// Dispatches AfterBuild for `entry`, then applies decorators and updaters
	/// in ascending priority.
	pub(crate) fn handle(&self, entry: &str, resolved: Instance) -> DiResult<Instance> {
		let _frame = self.container.inner().artefact.enter_unchecked(entry);
		self.container
			.register_declared_after_build(entry, resolved.class());

		let listeners = self
			.container
			.inner()
			.listeners
			.read()
			.after_build
			.listeners_for(Some(entry));
		if listeners.is_empty() {
			return Ok(resolved);
		}

		let mut event = AfterBuildEvent::new(self.container, entry, resolved);
		event
			.dispatch(&listeners)
			.map_err(|e| self.container.normalize(e))?;
		let (mut current, decorators, updaters) = event.into_pipeline();
		tracing::debug!(
			entry,
			decorators = decorators.len(),
			updaters = updaters.len(),
			"applying after-build pipeline"
		);

		for decorator in &decorators {
			current = self.decorate(entry, current, decorator)?;
		}
		for updater in &updaters {
			updater(&current, self.container).map_err(|e| self.container.normalize(e))?;
		}
		Ok(current)
	}

	fn decorate(&self, entry: &str, current: Instance, decorator: &Decorator) -> DiResult<Instance> {
		match decorator {
			Decorator::Callable(decorate) => {
				decorate(current, self.container).map_err(|e| self.container.normalize(e))
			}
			Decorator::Class(class) => self
				.decorate_with_class(entry, current, class)
				.map_err(|e| match e {
					DiError::BadResolverArgument(_) => e,
					other => DiError::container(
						format!("cannot apply decorator [{class}] to [{entry}]: {other}"),
						self.container.artefact_trail(),
					),
				}),
		}
	}

	fn decorate_with_class(&self, entry: &str, current: Instance, class: &str) -> DiResult<Instance> {
		let descriptor = self
			.container
			.reflector()
			.class(class)
			.filter(|descriptor| descriptor.is_instantiable())
			.ok_or_else(|| {
				DiError::container(
					format!("decorator [{class}] is not instantiable"),
					self.container.artefact_trail(),
				)
			})?;
		let first = descriptor
			.constructor_params()
			.and_then(<[_]>::first)
			.ok_or_else(|| {
				DiError::bad_argument(format!(
					"decorator [{class}] has no constructor parameter to receive [{entry}]"
				))
			})?;
		if let Some(expected) = first.param_type().class_name()
			&& !self
				.container
				.reflector()
				.is_subtype(current.class(), expected)
		{
			return Err(DiError::bad_argument(format!(
				"decorator [{class}] expects its first parameter ${} to be {expected}, [{}] given",
				first.name(),
				current.class()
			)));
		}

		let params = Params::new().with(first.name(), current);
		self.container
			.get_with(class, params)?
			.into_instance()
			.ok_or_else(|| {
				DiError::container(
					format!("decorator [{class}] did not produce an object"),
					self.container.artefact_trail(),
				)
			})
	}
}
