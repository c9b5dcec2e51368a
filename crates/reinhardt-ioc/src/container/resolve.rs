//! The resolution pipeline: binding lookup, BeforeBuild, construction,
//! AfterBuild and sharing.

use super::{Container, Resolved};
use crate::binding::{Binding, BindingSlot, Concrete, SharedBinding};
use crate::error::{DiError, DiResult};
use crate::event::BeforeBuildEvent;
use crate::pool::StackFrame;
use crate::reflect::Parameter;
use crate::resolver::{AfterBuildHandler, ParamResolver};
use crate::value::{Arguments, Instance, Params, Value};

impl Container {
	/// Resolves `id`.
	///
	/// With `dispatch_events` unset, BeforeBuild and AfterBuild are skipped
	/// for this entry (nested dependencies still dispatch their own events).
	pub fn resolve(&self, id: &str, params: Params, dispatch_events: bool) -> DiResult<Value> {
		self.resolve_entry(id, params, dispatch_events)
			.map_err(|e| self.normalize(e))
	}

	fn resolve_entry(&self, id: &str, params: Params, dispatch: bool) -> DiResult<Value> {
		let entry = self.canonical_id(id);
		let slot = self.inner().bindings.read().get(&entry).cloned();
		let (binding, auto_wired) = match slot {
			Some(BindingSlot::Shared(shared)) => {
				tracing::trace!(id = %entry, "shared instance cache hit");
				return Ok(shared.into_material());
			}
			Some(BindingSlot::Binding(binding)) => (binding, false),
			None if self.config().auto_wiring => (Binding::new(entry.as_str(), false), true),
			None => return Err(DiError::NotFound(entry)),
		};

		// An id bound to another bound id delegates to it entirely.
		if let Concrete::Class(class) = binding.concrete()
			&& *class != entry
			&& self.bound(class)
		{
			tracing::debug!(id = %entry, target = %class, "resolving through bound concrete");
			let value = self.resolve_entry(class, params, dispatch)?;
			if let Value::Object(instance) = &value {
				self.remember(&entry, &binding, class, instance);
			}
			return Ok(value);
		}

		let built = {
			let _frame = self.enter_params(&entry, params)?;
			let params = if dispatch {
				self.dispatch_before_build(&entry)?
			} else {
				self.current_params()
			};
			match binding.concrete() {
				Concrete::Factory(factory) => {
					tracing::debug!(id = %entry, "building from factory");
					factory(self, &params).map_err(|e| self.normalize(e))?
				}
				Concrete::Class(class) => {
					Value::Object(self.build_class(class, &entry, &params, auto_wired)?)
				}
			}
		};

		let Value::Object(instance) = built else {
			tracing::trace!(id = %entry, "non-object value, skipping after-build");
			return Ok(built);
		};
		let base = instance.class().to_string();
		let instance = if dispatch {
			AfterBuildHandler::new(self).handle(&entry, instance)?
		} else {
			instance
		};
		self.remember(&entry, &binding, &base, &instance);
		Ok(Value::Object(instance))
	}

	fn build_class(
		&self,
		class: &str,
		entry: &str,
		params: &Params,
		auto_wired: bool,
	) -> DiResult<Instance> {
		let Some(descriptor) = self.reflector().class(class) else {
			if auto_wired {
				return Err(DiError::NotFound(entry.to_string()));
			}
			return Err(DiError::container(
				format!("target class [{class}] does not exist"),
				self.artefact_trail(),
			));
		};
		if !descriptor.is_instantiable() {
			return Err(self.not_instantiable(class));
		}

		let _frame = self.inner().artefact.enter(class)?;
		tracing::debug!(class, id = entry, "building class");
		let arguments = match descriptor.constructor_params() {
			Some(constructor) => {
				ParamResolver::new(self, class, Some(entry)).resolve(constructor, params)?
			}
			None => Arguments::new(),
		};
		match descriptor.instantiate(arguments) {
			Some(result) => result.map_err(|e| self.normalize(e)),
			None => Err(self.not_instantiable(class)),
		}
	}

	fn not_instantiable(&self, class: &str) -> DiError {
		DiError::container(
			format!("target [{class}] is not instantiable"),
			self.artefact_trail(),
		)
	}

	fn enter_params(&self, entry: &str, params: Params) -> DiResult<StackFrame<'_, Params>> {
		let depth = self.inner().params.lock().len();
		let max = self.config().max_resolution_depth;
		if depth >= max {
			return Err(DiError::container(
				format!("maximum resolution depth ({max}) exceeded while resolving [{entry}]"),
				self.artefact_trail(),
			));
		}
		tracing::trace!(id = entry, depth, "entering parameter frame");
		Ok(StackFrame::enter(&self.inner().params, params))
	}

	/// Fires BeforeBuild and stores the (possibly replaced) parameters in the
	/// current frame.
	fn dispatch_before_build(&self, entry: &str) -> DiResult<Params> {
		let params = self.current_params();
		let listeners = self
			.inner()
			.listeners
			.read()
			.before_build
			.listeners_for(Some(entry));
		if listeners.is_empty() {
			return Ok(params);
		}
		tracing::debug!(id = entry, listeners = listeners.len(), "dispatching before-build event");
		let mut event = BeforeBuildEvent::new(self, entry, params);
		event.dispatch(&listeners).map_err(|e| self.normalize(e))?;
		let params = event.into_params();
		if let Some(top) = self.inner().params.lock().last_mut() {
			*top = params.clone();
		}
		Ok(params)
	}

	/// Records the resolution and caches shared objects.
	fn remember(&self, entry: &str, binding: &Binding, base: &str, instance: &Instance) {
		if binding.is_shared() {
			tracing::debug!(id = entry, class = %instance.class(), "sharing instance");
			self.inner().bindings.write().set(
				entry,
				BindingSlot::Shared(SharedBinding::promoted(instance.clone(), binding.clone())),
			);
			self.inner().resolved.write().set(
				entry,
				Resolved::Shared {
					base: base.to_string(),
					resolved: instance.class().to_string(),
				},
			);
		} else {
			self.inner()
				.resolved
				.write()
				.set(entry, Resolved::Instance(instance.class().to_string()));
		}
	}

	/// Whether `id` could be built right now without falling back to a default.
	pub(crate) fn can_build(&self, id: &str) -> bool {
		if self.bound(id) {
			return true;
		}
		let entry = self.canonical_id(id);
		self.config().auto_wiring
			&& self
				.reflector()
				.class(&entry)
				.is_some_and(|descriptor| descriptor.is_instantiable())
	}

	/// Registers the Building listener declared on `param`, once per key.
	pub(crate) fn register_declared_building(&self, param: &Parameter, key: &str) {
		let Some(source) = self.inner().declared.as_ref() else {
			return;
		};
		if !self.inner().fetched.lock().building.insert(key.to_string()) {
			return;
		}
		let Some(declared) = source.parameter_listener(param) else {
			return;
		};
		let mut listeners = self.inner().listeners.write();
		let priority = if declared.is_final {
			listeners.building.final_priority()
		} else {
			listeners.building.earliest_priority()
		};
		tracing::debug!(key, priority, is_final = declared.is_final, "registering declared building listener");
		listeners
			.building
			.add_for_entry(key, declared.listener, priority);
	}

	/// Registers the AfterBuild listener declared on `class`, once per entry.
	pub(crate) fn register_declared_after_build(&self, entry: &str, class: &str) {
		let Some(source) = self.inner().declared.as_ref() else {
			return;
		};
		if !self
			.inner()
			.fetched
			.lock()
			.after_build
			.insert(entry.to_string())
		{
			return;
		}
		let Some(declared) = self
			.reflector()
			.class(class)
			.and_then(|descriptor| source.class_listener(&descriptor))
		else {
			return;
		};
		let mut listeners = self.inner().listeners.write();
		let priority = if declared.is_final {
			listeners.after_build.final_priority()
		} else {
			listeners.after_build.earliest_priority()
		};
		tracing::debug!(entry, class, priority, is_final = declared.is_final, "registering declared after-build listener");
		listeners
			.after_build
			.add_for_entry(entry, declared.listener, priority);
	}
}
