//! The inversion-of-control container.
//!
//! A [`Container`] maps ids (interfaces, class names, aliases) to recipes and
//! resolves object graphs on demand:
//!
//! ```
//! use reinhardt_ioc::reflect::{ClassDescriptor, ClassRegistry, Parameter};
//! use reinhardt_ioc::Container;
//! use std::sync::Arc;
//!
//! struct Circle;
//! struct Canvas {
//!     shape: Arc<Circle>,
//! }
//!
//! let registry = ClassRegistry::new();
//! registry
//!     .register(ClassDescriptor::interface("Shape"))
//!     .register(
//!         ClassDescriptor::new("Circle")
//!             .implements("Shape")
//!             .without_constructor(|_| Ok(Circle)),
//!     )
//!     .register(ClassDescriptor::new("Canvas").constructor(
//!         vec![Parameter::new("shape").typed("Shape")],
//!         |args| Ok(Canvas { shape: args.object::<Circle>("shape")? }),
//!     ));
//!
//! let container = Container::with_reflector(Arc::new(registry));
//! container.bind_shared("Shape", "Circle").unwrap();
//!
//! let canvas = container.get_object::<Canvas>("Canvas").unwrap();
//! let shape = container.get_object::<Circle>("Shape").unwrap();
//! assert!(Arc::ptr_eq(&canvas.shape, &shape));
//! ```
//!
//! The container is a cheap handle: clones share the same stores.

mod builder;
mod global;
mod resolve;

pub use builder::ContainerBuilder;
pub use global::{global, init_global};

use crate::alias::Aliases;
use crate::artefact::Artefact;
use crate::binding::{Binding, BindingSlot, Concrete, MethodFactory, SharedBinding};
use crate::config::ContainerConfig;
use crate::contextual::{ContextualBindingBuilder, ContextualBindings};
use crate::error::{DiError, DiResult};
use crate::event::{EventKind, EventListenerBuilder, EventListeners};
use crate::pool::{CollectionStack, KeyStore, Stack};
use crate::reflect::{ClassRegistry, DeclaredListenerSource, DescriptorListeners, Reflector};
use crate::resolver::{CallableRef, MethodResolver};
use crate::tag::{TaggedGroup, Tags};
use crate::value::{Arguments, Instance, Params, Value};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Callback fired when a rebound id has been re-resolved.
pub type ReboundFn = Arc<dyn Fn(&Value, &Container) -> DiResult<()> + Send + Sync>;

/// What an entry resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
	/// A non-shared entry; the class of the last object built.
	Instance(String),
	/// A shared entry; the class originally built and the class produced after
	/// decoration.
	Shared { base: String, resolved: String },
}

impl Resolved {
	/// Final class of the resolved object.
	pub fn class(&self) -> &str {
		match self {
			Self::Instance(class) => class,
			Self::Shared { resolved, .. } => resolved,
		}
	}
}

/// A single store, for [`Container::reset_store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
	Bindings,
	Aliases,
	Resolved,
	Contextual,
	Tags,
	Rebound,
	MethodBindings,
	Listeners,
	/// Memo of declared listeners already registered.
	Fetched,
}

/// Declared listeners already registered, per Building key and per entry.
#[derive(Debug, Default)]
pub(crate) struct Fetched {
	pub(crate) building: HashSet<String>,
	pub(crate) after_build: HashSet<String>,
}

pub(crate) struct ContainerInner {
	pub(crate) config: ContainerConfig,
	pub(crate) reflector: Arc<dyn Reflector>,
	pub(crate) declared: Option<Arc<dyn DeclaredListenerSource>>,
	pub(crate) bindings: RwLock<KeyStore<BindingSlot>>,
	pub(crate) aliases: RwLock<Aliases>,
	pub(crate) resolved: RwLock<KeyStore<Resolved>>,
	pub(crate) contextual: RwLock<ContextualBindings>,
	pub(crate) tags: RwLock<Tags>,
	pub(crate) rebound: RwLock<CollectionStack<ReboundFn>>,
	pub(crate) method_bindings: RwLock<KeyStore<MethodFactory>>,
	pub(crate) listeners: RwLock<EventListeners>,
	pub(crate) fetched: Mutex<Fetched>,
	pub(crate) artefact: Artefact,
	pub(crate) params: Mutex<Stack<Params>>,
}

impl ContainerInner {
	fn new(
		config: ContainerConfig,
		reflector: Arc<dyn Reflector>,
		declared: Option<Arc<dyn DeclaredListenerSource>>,
		listeners: EventListeners,
	) -> Self {
		Self {
			config,
			reflector,
			declared,
			bindings: RwLock::new(KeyStore::new()),
			aliases: RwLock::new(Aliases::new()),
			resolved: RwLock::new(KeyStore::new()),
			contextual: RwLock::new(ContextualBindings::new()),
			tags: RwLock::new(Tags::new()),
			rebound: RwLock::new(CollectionStack::new()),
			method_bindings: RwLock::new(KeyStore::new()),
			listeners: RwLock::new(listeners),
			fetched: Mutex::new(Fetched::default()),
			artefact: Artefact::new(),
			params: Mutex::new(Stack::new()),
		}
	}
}

/// The container handle.
#[derive(Clone)]
pub struct Container {
	inner: Arc<ContainerInner>,
}

impl Container {
	/// A container with the default configuration and an empty [`ClassRegistry`].
	pub fn new() -> Self {
		Self::with_reflector(Arc::new(ClassRegistry::new()))
	}

	/// A container with the default configuration over `reflector`.
	pub fn with_reflector(reflector: Arc<dyn Reflector>) -> Self {
		Self::from_parts(
			ContainerConfig::default(),
			reflector,
			Some(Arc::new(DescriptorListeners)),
			EventListeners::default(),
		)
	}

	pub fn builder() -> ContainerBuilder {
		ContainerBuilder::new()
	}

	pub(crate) fn from_parts(
		config: ContainerConfig,
		reflector: Arc<dyn Reflector>,
		declared: Option<Arc<dyn DeclaredListenerSource>>,
		listeners: EventListeners,
	) -> Self {
		let declared = declared.filter(|_| config.scan_declared_listeners);
		Self {
			inner: Arc::new(ContainerInner::new(config, reflector, declared, listeners)),
		}
	}

	pub(crate) fn inner(&self) -> &ContainerInner {
		&self.inner
	}

	pub fn config(&self) -> &ContainerConfig {
		&self.inner.config
	}

	pub fn reflector(&self) -> &Arc<dyn Reflector> {
		&self.inner.reflector
	}

	/// Whether both handles point at the same container.
	pub fn ptr_eq(&self, other: &Container) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	// Registration

	/// Binds `id` to a class name or a factory.
	pub fn bind(&self, id: &str, concrete: impl Into<Concrete>) -> DiResult<()> {
		self.set_binding(id, Binding::new(concrete, false).into())
	}

	/// Binds `id` as a singleton.
	pub fn bind_shared(&self, id: &str, concrete: impl Into<Concrete>) -> DiResult<()> {
		self.set_binding(id, Binding::new(concrete, true).into())
	}

	/// Binds `id` as a singleton of the class of the same name.
	pub fn singleton(&self, id: &str) -> DiResult<()> {
		self.bind_shared(id, id)
	}

	pub fn bind_factory<F>(&self, id: &str, factory: F) -> DiResult<()>
	where
		F: Fn(&Container, &Params) -> DiResult<Value> + Send + Sync + 'static,
	{
		self.set_binding(id, Binding::new(Concrete::factory(factory), false).into())
	}

	pub fn bind_shared_factory<F>(&self, id: &str, factory: F) -> DiResult<()>
	where
		F: Fn(&Container, &Params) -> DiResult<Value> + Send + Sync + 'static,
	{
		self.set_binding(id, Binding::new(Concrete::factory(factory), true).into())
	}

	/// Binds `id` unless it is already bound; returns whether it bound.
	pub fn bind_if(&self, id: &str, concrete: impl Into<Concrete>, shared: bool) -> DiResult<bool> {
		if self.bound(id) {
			return Ok(false);
		}
		self.set_binding(id, Binding::new(concrete, shared).into())?;
		Ok(true)
	}

	/// Registers a realized singleton and returns it.
	pub fn bind_instance(&self, id: &str, instance: impl Into<Value>) -> DiResult<Value> {
		let value = instance.into();
		self.set_binding(id, SharedBinding::new(value.clone()).into())?;
		if let Some(instance) = value.as_instance() {
			self.inner.resolved.write().set(
				id,
				Resolved::Shared {
					base: instance.class().to_string(),
					resolved: instance.class().to_string(),
				},
			);
		}
		Ok(value)
	}

	/// Registers a method binding under `Class::method`.
	///
	/// The factory replaces the direct invocation of the method and receives
	/// the target object and the resolved arguments.
	pub fn bind_method<F>(&self, key: &str, factory: F)
	where
		F: Fn(&Instance, Arguments, &Container) -> DiResult<Value> + Send + Sync + 'static,
	{
		tracing::debug!(key, "binding method");
		self.inner
			.method_bindings
			.write()
			.set(key, Arc::new(factory) as MethodFactory);
	}

	pub fn has_method_binding(&self, key: &str) -> bool {
		self.inner.method_bindings.read().has(key)
	}

	fn set_binding(&self, id: &str, slot: BindingSlot) -> DiResult<()> {
		let was_known = self.bound(id) || self.resolved(id);
		self.inner.aliases.write().remove_alias(id);
		let shared_instance = matches!(slot, BindingSlot::Shared(_));
		if !shared_instance {
			self.inner.resolved.write().remove(id);
		}
		tracing::debug!(id, shared = slot.is_shared(), rebinding = was_known, "binding");
		self.inner.bindings.write().set(id, slot);
		if was_known {
			self.rebound(id)?;
		}
		Ok(())
	}

	fn rebound(&self, id: &str) -> DiResult<()> {
		let callbacks = self.inner.rebound.read().get(id).to_vec();
		if callbacks.is_empty() {
			return Ok(());
		}
		tracing::debug!(id, callbacks = callbacks.len(), "propagating rebind");
		let value = self.get(id)?;
		for callback in callbacks {
			callback(&value, self).map_err(|e| self.normalize(e))?;
		}
		Ok(())
	}

	/// Registers a callback fired whenever `id` is rebound, and returns the
	/// current value of `id`.
	pub fn rebinding<F>(&self, id: &str, callback: F) -> DiResult<Value>
	where
		F: Fn(&Value, &Container) -> DiResult<()> + Send + Sync + 'static,
	{
		let entry = self.canonical_id(id);
		if !self.bound(&entry) {
			return Err(DiError::NotFound(entry));
		}
		self.inner
			.rebound
			.write()
			.push(entry.as_str(), Arc::new(callback) as ReboundFn);
		self.get(&entry)
	}

	/// Makes `alias` resolve to `entry`.
	pub fn alias(&self, entry: &str, alias: &str) -> DiResult<()> {
		tracing::debug!(entry, alias, "aliasing");
		self.inner.aliases.write().add(entry, alias)
	}

	/// Adds every id to every tag.
	pub fn tag<I, T>(&self, ids: I, tags: T)
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
		T: IntoIterator,
		T::Item: AsRef<str>,
	{
		let ids: Vec<_> = ids.into_iter().collect();
		let mut store = self.inner.tags.write();
		for tag in tags {
			for id in &ids {
				store.add(tag.as_ref(), id.as_ref());
			}
		}
	}

	/// Lazily resolved members of `tag`.
	pub fn tagged(&self, tag: &str) -> TaggedGroup {
		let ids = self.inner.tags.read().ids(tag);
		TaggedGroup::new(self.clone(), ids)
	}

	/// Starts a contextual binding for `consumer`.
	pub fn when(&self, consumer: impl Into<String>) -> ContextualBindingBuilder<'_> {
		ContextualBindingBuilder::new(self, vec![consumer.into()])
	}

	/// Starts a contextual binding shared by several consumers.
	pub fn when_any<I>(&self, consumers: I) -> ContextualBindingBuilder<'_>
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		ContextualBindingBuilder::new(self, consumers.into_iter().map(Into::into).collect())
	}

	/// Starts an event listener registration.
	pub fn on(&self, kind: EventKind) -> EventListenerBuilder<'_> {
		EventListenerBuilder::new(self, kind)
	}

	// Resolution

	/// Resolves `id` with no parameter overrides.
	pub fn get(&self, id: &str) -> DiResult<Value> {
		self.resolve(id, Params::new(), true)
	}

	/// Resolves `id` with parameter overrides.
	pub fn get_with(&self, id: &str, params: Params) -> DiResult<Value> {
		self.resolve(id, params, true)
	}

	pub fn make(&self, id: &str, params: Params) -> DiResult<Value> {
		self.get_with(id, params)
	}

	/// Resolves `id` and downcasts the object.
	pub fn get_object<T: Any + Send + Sync>(&self, id: &str) -> DiResult<Arc<T>> {
		let value = self.get(id)?;
		value.downcast::<T>().ok_or_else(|| {
			DiError::bad_argument(format!(
				"[{id}] resolved to {} which is not a {}",
				value.describe(),
				std::any::type_name::<T>()
			))
		})
	}

	/// Resolves and invokes a callable.
	pub fn call(&self, callable: &CallableRef, params: Params, method: Option<&str>) -> DiResult<Value> {
		MethodResolver::new(self)
			.call(callable, &params, method)
			.map_err(|e| self.normalize(e))
	}

	/// Parses and invokes `"Class::method"` or `"function"`.
	pub fn call_str(&self, callable: &str, params: Params) -> DiResult<Value> {
		self.call(&CallableRef::parse(callable)?, params, None)
	}

	// Introspection

	/// Whether `id` is bound, aliased, or an instantiable class under auto-wiring.
	pub fn has(&self, id: &str) -> bool {
		self.bound(id) || self.can_build(id)
	}

	/// Whether `id` has a binding or is an alias.
	pub fn bound(&self, id: &str) -> bool {
		if self.inner.aliases.read().is_alias(id) {
			return true;
		}
		self.inner.bindings.read().has(id)
	}

	pub fn is_shared(&self, id: &str) -> bool {
		let entry = self.canonical_id(id);
		self.inner
			.bindings
			.read()
			.get(&entry)
			.is_some_and(BindingSlot::is_shared)
	}

	pub fn is_alias(&self, id: &str) -> bool {
		self.inner.aliases.read().is_alias(id)
	}

	/// Whether `id` has been resolved (or holds a realized instance).
	pub fn resolved(&self, id: &str) -> bool {
		let entry = self.canonical_id(id);
		self.inner.resolved.read().has(&entry)
			|| matches!(
				self.inner.bindings.read().get(&entry),
				Some(BindingSlot::Shared(_))
			)
	}

	/// Record of the last resolution of `id`.
	pub fn resolution(&self, id: &str) -> Option<Resolved> {
		let entry = self.canonical_id(id);
		self.inner.resolved.read().get(&entry).cloned()
	}

	/// Class produced by the last resolution of `id`, after decoration.
	pub fn resolved_class(&self, id: &str) -> Option<String> {
		self.resolution(id)
			.map(|resolved| resolved.class().to_string())
	}

	/// Follows aliases down to the entry.
	pub fn canonical_id(&self, id: &str) -> String {
		self.inner.aliases.read().canonical(id)
	}

	/// Parameter overrides of the innermost resolution in progress.
	pub fn current_params(&self) -> Params {
		self.inner.params.lock().last().cloned().unwrap_or_default()
	}

	/// Classes under construction, outermost first.
	pub fn artefact_trail(&self) -> Vec<String> {
		self.inner.artefact.trail()
	}

	// Lifecycle

	/// Drops the realized singleton of `id`; a shared binding is restored.
	pub fn forget_instance(&self, id: &str) {
		let entry = self.canonical_id(id);
		let mut bindings = self.inner.bindings.write();
		let restored = match bindings.get(&entry) {
			Some(BindingSlot::Shared(shared)) => Some(shared.origin().cloned()),
			_ => None,
		};
		match restored {
			Some(Some(origin)) => {
				bindings.set(entry.as_str(), BindingSlot::Binding(origin));
			}
			Some(None) => {
				bindings.remove(&entry);
			}
			None => return,
		}
		drop(bindings);
		tracing::debug!(id = %entry, "forgot instance");
		self.inner.resolved.write().remove(&entry);
	}

	/// Drops every realized singleton.
	pub fn forget_instances(&self) {
		let shared: Vec<String> = self
			.inner
			.bindings
			.read()
			.iter()
			.filter(|(_, slot)| matches!(slot, BindingSlot::Shared(_)))
			.map(|(id, _)| id.to_string())
			.collect();
		for id in shared {
			self.forget_instance(&id);
		}
	}

	/// Clears every store.
	pub fn reset(&self) {
		for kind in [
			StoreKind::Bindings,
			StoreKind::Aliases,
			StoreKind::Resolved,
			StoreKind::Contextual,
			StoreKind::Tags,
			StoreKind::Rebound,
			StoreKind::MethodBindings,
			StoreKind::Listeners,
			StoreKind::Fetched,
		] {
			self.reset_store(kind);
		}
		self.inner.artefact.clear();
		self.inner.params.lock().clear();
	}

	pub fn reset_store(&self, kind: StoreKind) {
		tracing::debug!(store = ?kind, "resetting store");
		match kind {
			StoreKind::Bindings => self.inner.bindings.write().reset(),
			StoreKind::Aliases => self.inner.aliases.write().reset(),
			StoreKind::Resolved => self.inner.resolved.write().reset(),
			StoreKind::Contextual => self.inner.contextual.write().reset(),
			StoreKind::Tags => self.inner.tags.write().reset(),
			StoreKind::Rebound => self.inner.rebound.write().reset(),
			StoreKind::MethodBindings => self.inner.method_bindings.write().reset(),
			StoreKind::Listeners => self.inner.listeners.write().clear(),
			StoreKind::Fetched => *self.inner.fetched.lock() = Fetched::default(),
		}
	}

	/// Turns user failures into container errors carrying the artefact trail.
	pub(crate) fn normalize(&self, error: DiError) -> DiError {
		if error.is_container_exception() {
			error
		} else {
			DiError::container(format!("{error:#}"), self.artefact_trail())
		}
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container")
			.field("config", &self.inner.config)
			.field("bindings", &self.inner.bindings.read().len())
			.field("aliases", &self.inner.aliases.read().len())
			.field("listeners", &self.inner.listeners.read().len())
			.finish_non_exhaustive()
	}
}
