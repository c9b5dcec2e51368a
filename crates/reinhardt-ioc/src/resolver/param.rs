//! Constructor and method parameter resolution

use crate::binding::{Binding, BindingSlot, Concrete, SharedBinding};
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::event::BuildingEvent;
use crate::reflect::{CONTAINER_TYPES, ParamType, Parameter};
use crate::value::{Arguments, Instance, Params, Value};

/// Resolves the parameters of one consumer.
///
/// `scope` is the consumer (a class name, or `Class::method`) and is the
/// primary contextual-binding scope; `entry` is the id that was requested when
/// it differs from the class being built.
pub(crate) struct ParamResolver<'c> {
	container: &'c Container,
	scope: String,
	entry: Option<String>,
}

impl<'c> ParamResolver<'c> {
	pub(crate) fn new(container: &'c Container, scope: &str, entry: Option<&str>) -> Self {
		Self {
			container,
			scope: scope.to_string(),
			entry: entry.filter(|entry| *entry != scope).map(str::to_string),
		}
	}

	pub(crate) fn resolve(&self, params: &[Parameter], explicit: &Params) -> DiResult<Arguments> {
		let mut arguments = Arguments::new();
		for param in params {
			let value = self.resolve_parameter(param, explicit)?;
			arguments.push(param.name(), value);
		}
		Ok(arguments)
	}

	fn resolve_parameter(&self, param: &Parameter, explicit: &Params) -> DiResult<Value> {
		if let Some(value) = explicit.get(param.name()) {
			tracing::trace!(consumer = %self.scope, param = %param.name(), "using explicit argument");
			return Ok(value.clone());
		}
		match param.param_type() {
			ParamType::Named(type_name) => self.resolve_typed(param, type_name),
			ParamType::Untyped | ParamType::Builtin(_) => {
				if let Some(value) = self.contextual(&format!("${}", param.name()))? {
					return Ok(value);
				}
				self.fallback(param, None)
			}
		}
	}

	fn resolve_typed(&self, param: &Parameter, type_name: &str) -> DiResult<Value> {
		let entry = self.container.canonical_id(type_name);
		if let Some(value) = self.from_building_event(param, type_name, &entry)? {
			return Ok(value);
		}
		if let Some(value) = self.contextual(&entry)? {
			return Ok(value);
		}
		if entry != type_name
			&& let Some(value) = self.contextual(type_name)?
		{
			return Ok(value);
		}
		let reflector = self.container.reflector();
		if CONTAINER_TYPES
			.iter()
			.any(|container_type| reflector.is_subtype(type_name, container_type))
		{
			return Ok(Value::Object(Instance::new(
				CONTAINER_TYPES[0],
				self.container.clone(),
			)));
		}
		let has_fallback = param.default().is_some() || param.is_variadic();
		if has_fallback && !self.container.can_build(type_name) {
			return self.fallback(param, Some(type_name));
		}
		match self.container.get(type_name) {
			Ok(value) => Ok(value),
			Err(e) if e.is_not_found() => {
				tracing::debug!(consumer = %self.scope, param = %param.name(), type_name, "dependency not found, using fallback");
				self.fallback(param, Some(type_name))
			}
			Err(e) => Err(e),
		}
	}

	/// Supplies the parameter through a Building event.
	///
	/// `entry` is the declared type after alias resolution; listeners scoped
	/// to the declared name before it became an alias still match.
	fn from_building_event(
		&self,
		param: &Parameter,
		type_name: &str,
		entry: &str,
	) -> DiResult<Option<Value>> {
		let key = BuildingEvent::key_for(entry, param.name());
		let declared_key = BuildingEvent::key_for(type_name, param.name());
		self.container.register_declared_building(param, &key);

		let cached = self.container.inner().bindings.read().get(&key).cloned();
		if let Some(BindingSlot::Shared(shared)) = cached {
			tracing::trace!(key = %key, "building binding cache hit");
			return Ok(Some(shared.into_material()));
		}

		let listeners = self
			.container
			.inner()
			.listeners
			.read()
			.building
			.listeners_for_entries(&[key.as_str(), entry, declared_key.as_str(), type_name]);
		if listeners.is_empty() {
			return Ok(None);
		}

		tracing::debug!(key = %key, consumer = %self.scope, listeners = listeners.len(), "dispatching building event");
		let mut event = BuildingEvent::new(self.container, entry, param.name(), &self.scope);
		event
			.dispatch(&listeners)
			.map_err(|e| self.container.normalize(e))?;

		match event.into_binding() {
			None => Ok(None),
			Some(BindingSlot::Binding(binding)) => self.build_deferred(&key, binding).map(Some),
			Some(BindingSlot::Shared(shared)) => {
				self.check_type(param, type_name, entry, shared.material())?;
				let value = shared.material().clone();
				self.container
					.inner()
					.bindings
					.write()
					.set(key, BindingSlot::Shared(shared));
				Ok(Some(value))
			}
		}
	}

	fn build_deferred(&self, key: &str, binding: Binding) -> DiResult<Value> {
		let value = match binding.concrete() {
			Concrete::Factory(factory) => factory(self.container, &self.container.current_params())
				.map_err(|e| self.container.normalize(e))?,
			Concrete::Class(class) => self.container.get(class)?,
		};
		if binding.is_shared() {
			self.container
				.inner()
				.bindings
				.write()
				.set(key, BindingSlot::Shared(SharedBinding::new(value.clone())));
		}
		Ok(value)
	}

	fn check_type(&self, param: &Parameter, type_name: &str, entry: &str, value: &Value) -> DiResult<()> {
		let reflector = self.container.reflector();
		let matches = value.as_instance().is_some_and(|instance| {
			reflector.is_subtype(instance.class(), type_name) || reflector.is_subtype(instance.class(), entry)
		});
		if matches {
			return Ok(());
		}
		Err(DiError::bad_argument(format!(
			"the value bound to parameter ${} of [{}] must be of type {type_name}, {} given",
			param.name(),
			self.scope,
			value.describe()
		)))
	}

	fn contextual(&self, need: &str) -> DiResult<Option<Value>> {
		let give = {
			let aliases = self.container.inner().aliases.read();
			let mut consumers = vec![self.scope.clone()];
			consumers.extend(self.entry.iter().cloned());
			consumers.extend(aliases.aliases_of(&self.scope));
			drop(aliases);
			self.container
				.inner()
				.contextual
				.read()
				.find(consumers.iter().map(String::as_str), need)
		};
		match give {
			Some(give) => {
				tracing::debug!(consumer = %self.scope, need, "using contextual binding");
				give.materialize(self.container).map(Some)
			}
			None => Ok(None),
		}
	}

	fn fallback(&self, param: &Parameter, type_name: Option<&str>) -> DiResult<Value> {
		if let Some(default) = param.default() {
			return Ok(default.clone());
		}
		if param.is_variadic() {
			return Ok(Value::List(Vec::new()));
		}
		let declaring = param.declaring_class().unwrap_or(&self.scope);
		let message = match type_name {
			Some(type_name) => format!(
				"unresolvable dependency resolving [${} ({type_name})] in class {declaring}",
				param.name()
			),
			None => format!(
				"unresolvable dependency resolving [${}] in class {declaring}",
				param.name()
			),
		};
		Err(DiError::container(message, self.container.artefact_trail()))
	}
}
