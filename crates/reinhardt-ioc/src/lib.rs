//! # Reinhardt IoC
//!
//! Inversion-of-control container for Reinhardt: maps ids (interfaces, class
//! names, aliases) to construction recipes and resolves object graphs on
//! demand, injecting constructor and method dependencies recursively.
//!
//! ## Features
//!
//! - **Bindings**: class names or factories, shared (singleton) or not
//! - **Aliases and tags**: alternative ids and lazily resolved groups
//! - **Contextual bindings**: `when(consumer).needs(dependency).give(...)`
//! - **Lifecycle events**: BeforeBuild, Building and AfterBuild listeners with
//!   priorities, entry scopes and `stop_propagation()`
//! - **Decorators**: AfterBuild decorator chains and in-place updaters
//! - **Rebinding hooks**: callbacks fired when a resolved id is rebound
//! - **Cycle detection**: construction cycles fail with the rendered path
//!
//! ## Reflection
//!
//! Classes are described up front with [`reflect::ClassDescriptor`] and served
//! through the [`reflect::Reflector`] trait; [`reflect::ClassRegistry`] is the
//! in-memory implementation.
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_ioc::event::{AfterBuildEvent, EventKind, Listener};
//! use reinhardt_ioc::reflect::{ClassDescriptor, ClassRegistry};
//! use reinhardt_ioc::Container;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Circle;
//!
//! let registry = ClassRegistry::new();
//! registry.register(ClassDescriptor::new("Circle").without_constructor(|_| Ok(Circle)));
//!
//! let container = Container::with_reflector(Arc::new(registry));
//! container.bind_shared("Shape", "Circle").unwrap();
//!
//! let built = Arc::new(AtomicUsize::new(0));
//! let counter = built.clone();
//! container
//!     .on(EventKind::AfterBuild)
//!     .for_entry("Shape")
//!     .listen_to(Listener::after_build(move |_: &mut AfterBuildEvent<'_>| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let first = container.get("Shape").unwrap();
//! let second = container.get("Shape").unwrap();
//! assert!(first.as_instance().unwrap().ptr_eq(second.as_instance().unwrap()));
//! assert_eq!(built.load(Ordering::SeqCst), 1);
//! ```

pub mod alias;
pub mod artefact;
pub mod binding;
pub mod config;
pub mod container;
pub mod contextual;
pub mod error;
pub mod event;
pub mod pool;
pub mod reflect;
pub mod resolver;
pub mod tag;
pub mod value;

pub use binding::{Binding, BindingSlot, Concrete, Factory, MethodFactory, SharedBinding};
pub use config::ContainerConfig;
pub use container::{
	Container, ContainerBuilder, ReboundFn, Resolved, StoreKind, global, init_global,
};
pub use contextual::{ContextualBindingBuilder, Give};
pub use error::{DiError, DiResult};
pub use event::{
	AfterBuildEvent, BeforeBuildEvent, BuildingEvent, DEFAULT_PRIORITY, Decorator, EventKind,
	Listener, ListenerCatalog, ListenerSnapshot,
};
pub use reflect::{ClassDescriptor, ClassRegistry, Parameter, Reflector};
pub use resolver::{CallableRef, Lambda};
pub use tag::TaggedGroup;
pub use value::{Arguments, Instance, Params, Value};
