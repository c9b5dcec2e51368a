//! Reflection capability used to construct classes and invoke methods.
//!
//! Rust has no runtime reflection, so classes, their constructor parameters and
//! their methods are described up front with [`ClassDescriptor`],
//! [`Parameter`], [`MethodDescriptor`] and [`FunctionDescriptor`], then served
//! to the container through the [`Reflector`] trait. [`ClassRegistry`] is the
//! in-memory implementation.
//!
//! Declarative listeners (the "attach a Building listener to this parameter"
//! and "decorate this class after it is built" markers) are part of the
//! descriptors and are surfaced through [`DeclaredListenerSource`].
//!
//! # Examples
//!
//! ```
//! use reinhardt_ioc::reflect::{ClassDescriptor, ClassRegistry, Parameter, Reflector};
//!
//! struct Circle;
//! struct Canvas;
//!
//! let registry = ClassRegistry::new();
//! registry.register(ClassDescriptor::interface("Shape"));
//! registry.register(
//!     ClassDescriptor::new("Circle")
//!         .implements("Shape")
//!         .without_constructor(|_| Ok(Circle)),
//! );
//! registry.register(
//!     ClassDescriptor::new("Canvas")
//!         .constructor(vec![Parameter::new("shape").typed("Shape")], |_| Ok(Canvas)),
//! );
//!
//! assert!(registry.is_subtype("Circle", "Shape"));
//! assert!(!registry.class("Shape").unwrap().is_instantiable());
//! ```

use crate::error::DiResult;
use crate::event::{AfterBuildListener, BuildingListener};
use crate::value::{Arguments, Instance, Value};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Type names that denote the container itself.
pub const CONTAINER_TYPES: &[&str] = &["Container", "ContainerInterface"];

/// Type names treated as builtin (never auto-wired, never routed to Building events).
pub const BUILTIN_TYPES: &[&str] = &[
	"bool", "int", "float", "string", "array", "list", "map", "mixed", "null", "callable",
	"iterable", "object", "i32", "i64", "u32", "u64", "usize", "f32", "f64", "str", "String",
];

/// Constructor closure: receives resolved arguments, returns the built object.
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> DiResult<Instance> + Send + Sync>;

/// Method closure: receives the target object and resolved arguments.
pub type MethodFn = Arc<dyn Fn(&Instance, Arguments) -> DiResult<Value> + Send + Sync>;

/// Free function closure.
pub type FunctionFn = Arc<dyn Fn(Arguments) -> DiResult<Value> + Send + Sync>;

/// A listener declared on a parameter or a class.
///
/// `is_final` pins the listener behind every other listener of its registry
/// (`high + 1`); otherwise it runs ahead of all of them (`low - 1`).
#[derive(Clone)]
pub struct DeclaredListener<L> {
	pub listener: L,
	pub is_final: bool,
}

impl<L> fmt::Debug for DeclaredListener<L> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeclaredListener")
			.field("is_final", &self.is_final)
			.finish_non_exhaustive()
	}
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
	/// No type hint.
	Untyped,
	/// A builtin type (`int`, `string`, ...).
	Builtin(String),
	/// A class or interface name.
	Named(String),
}

impl ParamType {
	/// Classifies a type hint as builtin or named.
	pub fn from_hint(hint: &str) -> Self {
		if BUILTIN_TYPES.contains(&hint) {
			Self::Builtin(hint.to_string())
		} else {
			Self::Named(hint.to_string())
		}
	}

	/// Class or interface name, when the type is not builtin.
	pub fn class_name(&self) -> Option<&str> {
		match self {
			Self::Named(name) => Some(name),
			_ => None,
		}
	}
}

/// A constructor, method or function parameter.
#[derive(Clone)]
pub struct Parameter {
	name: String,
	ty: ParamType,
	default: Option<Value>,
	variadic: bool,
	declaring_class: Option<String>,
	listener: Option<DeclaredListener<BuildingListener>>,
}

impl Parameter {
	/// An untyped, required parameter.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: ParamType::Untyped,
			default: None,
			variadic: false,
			declaring_class: None,
			listener: None,
		}
	}

	/// Sets the type hint; builtin names are recognized automatically.
	pub fn typed(mut self, hint: &str) -> Self {
		self.ty = ParamType::from_hint(hint);
		self
	}

	/// Sets a default value.
	pub fn default_value(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// Shorthand for a `null` default.
	pub fn nullable(self) -> Self {
		self.default_value(Value::null())
	}

	pub fn variadic(mut self) -> Self {
		self.variadic = true;
		self
	}

	/// Declares a Building listener fired while this parameter is resolved.
	pub fn listened_by(mut self, listener: BuildingListener, is_final: bool) -> Self {
		self.listener = Some(DeclaredListener { listener, is_final });
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn param_type(&self) -> &ParamType {
		&self.ty
	}

	pub fn default(&self) -> Option<&Value> {
		self.default.as_ref()
	}

	pub fn is_variadic(&self) -> bool {
		self.variadic
	}

	pub fn declaring_class(&self) -> Option<&str> {
		self.declaring_class.as_deref()
	}

	pub fn declared_listener(&self) -> Option<&DeclaredListener<BuildingListener>> {
		self.listener.as_ref()
	}

	fn declared_by(mut self, class: &str) -> Self {
		self.declaring_class = Some(class.to_string());
		self
	}
}

impl fmt::Debug for Parameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Parameter")
			.field("name", &self.name)
			.field("ty", &self.ty)
			.field("default", &self.default)
			.field("variadic", &self.variadic)
			.field("declaring_class", &self.declaring_class)
			.finish_non_exhaustive()
	}
}

/// A method exposed to `Container::call`.
#[derive(Clone)]
pub struct MethodDescriptor {
	name: String,
	params: Vec<Parameter>,
	handler: MethodFn,
}

impl MethodDescriptor {
	pub fn new<F>(name: impl Into<String>, params: Vec<Parameter>, handler: F) -> Self
	where
		F: Fn(&Instance, Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			params,
			handler: Arc::new(handler),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &[Parameter] {
		&self.params
	}

	pub fn invoke(&self, target: &Instance, args: Arguments) -> DiResult<Value> {
		(self.handler)(target, args)
	}
}

/// A free function (or closure) exposed to `Container::call`.
#[derive(Clone)]
pub struct FunctionDescriptor {
	name: String,
	params: Vec<Parameter>,
	handler: FunctionFn,
}

impl FunctionDescriptor {
	pub fn new<F>(name: impl Into<String>, params: Vec<Parameter>, handler: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		let name = name.into();
		let params = params
			.into_iter()
			.map(|param| param.declared_by(&name))
			.collect();
		Self {
			name,
			params,
			handler: Arc::new(handler),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &[Parameter] {
		&self.params
	}

	pub fn invoke(&self, args: Arguments) -> DiResult<Value> {
		(self.handler)(args)
	}
}

impl fmt::Debug for FunctionDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FunctionDescriptor")
			.field("name", &self.name)
			.field("params", &self.params)
			.finish_non_exhaustive()
	}
}

/// Everything the container needs to know about a class.
#[derive(Clone)]
pub struct ClassDescriptor {
	name: String,
	supertypes: Vec<String>,
	constructor: Option<Vec<Parameter>>,
	factory: Option<ConstructorFn>,
	methods: HashMap<String, MethodDescriptor>,
	listener: Option<DeclaredListener<AfterBuildListener>>,
}

impl ClassDescriptor {
	/// A class with no constructor and no way to instantiate it yet.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			supertypes: Vec::new(),
			constructor: None,
			factory: None,
			methods: HashMap::new(),
			listener: None,
		}
	}

	/// An interface or abstract class: reflectable but never instantiable.
	pub fn interface(name: impl Into<String>) -> Self {
		Self::new(name)
	}

	/// Declares a supertype (interface or parent class).
	pub fn implements(mut self, supertype: impl Into<String>) -> Self {
		self.supertypes.push(supertype.into());
		self
	}

	/// Declares a constructor with parameters.
	///
	/// The closure returns the object; it is tagged with this class name.
	pub fn constructor<T, F>(mut self, params: Vec<Parameter>, build: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(Arguments) -> DiResult<T> + Send + Sync + 'static,
	{
		let class = self.name.clone();
		self.constructor = Some(
			params
				.into_iter()
				.map(|param| param.declared_by(&class))
				.collect(),
		);
		self.factory = Some(Arc::new(move |args| {
			build(args).map(|object| Instance::new(class.as_str(), object))
		}));
		self
	}

	/// Declares a class without a constructor; it is instantiated directly.
	pub fn without_constructor<T, F>(mut self, build: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(Arguments) -> DiResult<T> + Send + Sync + 'static,
	{
		let class = self.name.clone();
		self.constructor = None;
		self.factory = Some(Arc::new(move |args| {
			build(args).map(|object| Instance::new(class.as_str(), object))
		}));
		self
	}

	/// Exposes a method to `Container::call`.
	pub fn method(mut self, method: MethodDescriptor) -> Self {
		let class = self.name.clone();
		let method = MethodDescriptor {
			params: method
				.params
				.into_iter()
				.map(|param| param.declared_by(&class))
				.collect(),
			..method
		};
		self.methods.insert(method.name.clone(), method);
		self
	}

	/// Declares an AfterBuild listener fired whenever the class is built.
	pub fn decorated_by(mut self, listener: AfterBuildListener, is_final: bool) -> Self {
		self.listener = Some(DeclaredListener { listener, is_final });
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn supertypes(&self) -> &[String] {
		&self.supertypes
	}

	pub fn is_instantiable(&self) -> bool {
		self.factory.is_some()
	}

	/// Constructor parameters, or `None` when the class has no constructor.
	pub fn constructor_params(&self) -> Option<&[Parameter]> {
		self.constructor.as_deref()
	}

	pub fn get_method(&self, name: &str) -> Option<&MethodDescriptor> {
		self.methods.get(name)
	}

	pub fn declared_listener(&self) -> Option<&DeclaredListener<AfterBuildListener>> {
		self.listener.as_ref()
	}

	/// Runs the constructor closure.
	///
	/// Returns `None` when the class is not instantiable.
	pub fn instantiate(&self, args: Arguments) -> Option<DiResult<Instance>> {
		self.factory.as_ref().map(|factory| factory(args))
	}
}

impl fmt::Debug for ClassDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassDescriptor")
			.field("name", &self.name)
			.field("supertypes", &self.supertypes)
			.field("constructor", &self.constructor)
			.field("instantiable", &self.is_instantiable())
			.field("methods", &self.methods.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

/// Source of class and function metadata.
pub trait Reflector: Send + Sync {
	fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>>;

	fn function(&self, name: &str) -> Option<Arc<FunctionDescriptor>>;

	/// Whether `class` is `ty` or declares it, directly or transitively, as a supertype.
	fn is_subtype(&self, class: &str, ty: &str) -> bool {
		if class == ty {
			return true;
		}
		let mut visited = HashSet::new();
		let mut pending = vec![class.to_string()];
		while let Some(current) = pending.pop() {
			if !visited.insert(current.clone()) {
				continue;
			}
			let Some(descriptor) = self.class(&current) else {
				continue;
			};
			for supertype in descriptor.supertypes() {
				if supertype == ty {
					return true;
				}
				pending.push(supertype.clone());
			}
		}
		false
	}
}

/// In-memory [`Reflector`].
#[derive(Default)]
pub struct ClassRegistry {
	classes: RwLock<HashMap<String, Arc<ClassDescriptor>>>,
	functions: RwLock<HashMap<String, Arc<FunctionDescriptor>>>,
}

impl ClassRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) a class.
	pub fn register(&self, descriptor: ClassDescriptor) -> &Self {
		tracing::trace!(class = %descriptor.name(), "registering class descriptor");
		self.classes
			.write()
			.insert(descriptor.name().to_string(), Arc::new(descriptor));
		self
	}

	/// Registers (or replaces) a free function.
	pub fn register_function(&self, descriptor: FunctionDescriptor) -> &Self {
		self.functions
			.write()
			.insert(descriptor.name().to_string(), Arc::new(descriptor));
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.classes.read().contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.classes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.read().is_empty()
	}
}

impl Reflector for ClassRegistry {
	fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
		self.classes.read().get(name).cloned()
	}

	fn function(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
		self.functions.read().get(name).cloned()
	}
}

/// Discovers declarative listeners on parameters and classes.
pub trait DeclaredListenerSource: Send + Sync {
	fn parameter_listener(&self, param: &Parameter) -> Option<DeclaredListener<BuildingListener>>;

	fn class_listener(&self, class: &ClassDescriptor)
	-> Option<DeclaredListener<AfterBuildListener>>;
}

/// Reads declarations straight from the descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorListeners;

impl DeclaredListenerSource for DescriptorListeners {
	fn parameter_listener(&self, param: &Parameter) -> Option<DeclaredListener<BuildingListener>> {
		param.declared_listener().cloned()
	}

	fn class_listener(
		&self,
		class: &ClassDescriptor,
	) -> Option<DeclaredListener<AfterBuildListener>> {
		class.declared_listener().cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct Square;

	#[rstest]
	fn test_param_type_classification() {
		assert_eq!(
			ParamType::from_hint("int"),
			ParamType::Builtin("int".to_string())
		);
		assert_eq!(
			ParamType::from_hint("Logger"),
			ParamType::Named("Logger".to_string())
		);
		assert_eq!(Parameter::new("x").param_type(), &ParamType::Untyped);
	}

	#[rstest]
	fn test_constructor_params_record_declaring_class() {
		// Arrange
		let descriptor = ClassDescriptor::new("Square")
			.constructor(vec![Parameter::new("side").typed("float")], |_| Ok(Square));

		// Act
		let params = descriptor.constructor_params().unwrap();

		// Assert
		assert_eq!(params[0].declaring_class(), Some("Square"));
		assert!(descriptor.is_instantiable());
	}

	#[rstest]
	fn test_is_subtype_walks_transitively_and_survives_loops() {
		// Arrange
		let registry = ClassRegistry::new();
		registry
			.register(ClassDescriptor::interface("Shape").implements("Drawable"))
			.register(ClassDescriptor::interface("Drawable").implements("Shape"))
			.register(
				ClassDescriptor::new("Square")
					.implements("Shape")
					.without_constructor(|_| Ok(Square)),
			);

		// Assert
		assert!(registry.is_subtype("Square", "Drawable"));
		assert!(registry.is_subtype("Square", "Square"));
		assert!(!registry.is_subtype("Square", "Logger"));
	}

	#[rstest]
	fn test_instantiate_tags_object_with_class_name() {
		// Arrange
		let descriptor = ClassDescriptor::new("Square").without_constructor(|_| Ok(Square));

		// Act
		let instance = descriptor.instantiate(Arguments::new()).unwrap().unwrap();

		// Assert
		assert_eq!(instance.class(), "Square");
		assert!(instance.downcast_ref::<Square>().is_some());
		assert!(
			ClassDescriptor::interface("Shape")
				.instantiate(Arguments::new())
				.is_none()
		);
	}
}
