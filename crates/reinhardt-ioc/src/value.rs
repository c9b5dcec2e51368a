//! Runtime values produced and consumed by the container.
//!
//! Entries resolve to a [`Value`]: either an [`Instance`] (a type-erased object
//! tagged with its class name), a plain scalar, or a list of values. Only
//! objects take part in sharing and AfterBuild decoration.

use crate::error::{DiError, DiResult};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased object together with the class it was built as.
///
/// Cloning an `Instance` clones the handle, not the object: two clones are the
/// same object for [`Instance::ptr_eq`].
///
/// # Examples
///
/// ```
/// use reinhardt_ioc::Instance;
///
/// struct Circle {
///     radius: f64,
/// }
///
/// let circle = Instance::new("Circle", Circle { radius: 2.0 });
/// assert_eq!(circle.class(), "Circle");
/// assert_eq!(circle.downcast_ref::<Circle>().unwrap().radius, 2.0);
///
/// let same = circle.clone();
/// assert!(circle.ptr_eq(&same));
/// ```
#[derive(Clone)]
pub struct Instance {
	class: Arc<str>,
	object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
	/// Wraps `object` as an instance of `class`.
	pub fn new<T: Any + Send + Sync>(class: impl Into<Arc<str>>, object: T) -> Self {
		Self {
			class: class.into(),
			object: Arc::new(object),
		}
	}

	/// Wraps an already shared object.
	pub fn from_arc<T: Any + Send + Sync>(class: impl Into<Arc<str>>, object: Arc<T>) -> Self {
		Self {
			class: class.into(),
			object,
		}
	}

	/// Class the object was built as.
	pub fn class(&self) -> &str {
		&self.class
	}

	/// Returns the object as `Arc<T>` when it has type `T`.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		Arc::clone(&self.object).downcast::<T>().ok()
	}

	/// Borrows the object as `T` when it has type `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.object.downcast_ref::<T>()
	}

	/// Whether both handles point to the same object.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		Arc::ptr_eq(&self.object, &other.object)
	}

	/// Address-based identifier of the object, stable for its lifetime.
	pub fn object_id(&self) -> usize {
		Arc::as_ptr(&self.object) as *const () as usize
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Instance({}#{:x})", self.class, self.object_id())
	}
}

/// Any value the container can hand out.
#[derive(Clone)]
pub enum Value {
	/// A built object.
	Object(Instance),
	/// A plain value (string, number, bool, null, JSON array/map).
	Scalar(serde_json::Value),
	/// A collection of values, used for variadic parameters.
	List(Vec<Value>),
}

impl Value {
	/// The null scalar.
	pub fn null() -> Self {
		Self::Scalar(serde_json::Value::Null)
	}

	/// Shorthand for `Value::Object(Instance::new(class, object))`.
	pub fn object<T: Any + Send + Sync>(class: impl Into<Arc<str>>, object: T) -> Self {
		Self::Object(Instance::new(class, object))
	}

	/// Shorthand for a scalar value.
	pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
		Self::Scalar(value.into())
	}

	/// Whether the value is the null scalar.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Scalar(serde_json::Value::Null))
	}

	pub fn as_instance(&self) -> Option<&Instance> {
		match self {
			Self::Object(instance) => Some(instance),
			_ => None,
		}
	}

	pub fn into_instance(self) -> Option<Instance> {
		match self {
			Self::Object(instance) => Some(instance),
			_ => None,
		}
	}

	pub fn as_scalar(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Scalar(scalar) => Some(scalar),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(values) => Some(values),
			_ => None,
		}
	}

	/// Returns the wrapped object as `Arc<T>` when this is an object of type `T`.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.as_instance().and_then(Instance::downcast::<T>)
	}

	/// Human readable description used in error messages.
	pub fn describe(&self) -> String {
		match self {
			Self::Object(instance) => format!("instance of {}", instance.class()),
			Self::Scalar(serde_json::Value::Null) => "null".to_string(),
			Self::Scalar(serde_json::Value::Bool(_)) => "bool".to_string(),
			Self::Scalar(serde_json::Value::Number(_)) => "number".to_string(),
			Self::Scalar(serde_json::Value::String(_)) => "string".to_string(),
			Self::Scalar(serde_json::Value::Array(_)) => "array".to_string(),
			Self::Scalar(serde_json::Value::Object(_)) => "map".to_string(),
			Self::List(values) => format!("list of {} values", values.len()),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Object(instance) => instance.fmt(f),
			Self::Scalar(scalar) => write!(f, "Scalar({scalar})"),
			Self::List(values) => f.debug_list().entries(values).finish(),
		}
	}
}

impl From<Instance> for Value {
	fn from(instance: Instance) -> Self {
		Self::Object(instance)
	}
}

impl From<serde_json::Value> for Value {
	fn from(scalar: serde_json::Value) -> Self {
		Self::Scalar(scalar)
	}
}

impl From<Vec<Value>> for Value {
	fn from(values: Vec<Value>) -> Self {
		Self::List(values)
	}
}

/// Explicit, name-keyed parameter overrides passed to `get_with()` / `call()`.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc::{Params, Value};
///
/// let params = Params::new().with("radius", Value::scalar(3));
/// assert!(params.contains("radius"));
/// assert!(!params.contains("color"));
/// ```
#[derive(Clone, Default, Debug)]
pub struct Params {
	values: HashMap<String, Value>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an override and returns `self` for chaining.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.insert(name.into(), value.into());
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.values.insert(name.into(), value.into())
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.values.remove(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values.iter().map(|(name, value)| (name.as_str(), value))
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			values: iter
				.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		}
	}
}

/// Resolved arguments handed to constructors, methods and functions.
///
/// Arguments keep declaration order and can be looked up by parameter name.
#[derive(Clone, Default, Debug)]
pub struct Arguments {
	values: Vec<(String, Value)>,
}

impl Arguments {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an argument and returns `self` for chaining.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.push(name, value);
		self
	}

	pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.values.push((name.into(), value.into()));
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values
			.iter()
			.find(|(candidate, _)| candidate == name)
			.map(|(_, value)| value)
	}

	/// Returns the argument named `name` or a [`DiError::BadResolverArgument`].
	pub fn value(&self, name: &str) -> DiResult<&Value> {
		self.get(name)
			.ok_or_else(|| DiError::bad_argument(format!("missing argument ${name}")))
	}

	/// Returns the argument as an instance.
	pub fn instance(&self, name: &str) -> DiResult<Instance> {
		match self.value(name)? {
			Value::Object(instance) => Ok(instance.clone()),
			other => Err(DiError::bad_argument(format!(
				"argument ${name} is {}, expected an object",
				other.describe()
			))),
		}
	}

	/// Returns the argument as `Arc<T>`.
	pub fn object<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
		let instance = self.instance(name)?;
		instance.downcast::<T>().ok_or_else(|| {
			DiError::bad_argument(format!(
				"argument ${name} is an instance of {}, not {}",
				instance.class(),
				std::any::type_name::<T>()
			))
		})
	}

	/// Returns the argument as `Some(Arc<T>)`, or `None` when it is null or missing.
	pub fn optional<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
		match self.get(name) {
			None => Ok(None),
			Some(value) if value.is_null() => Ok(None),
			Some(_) => self.object::<T>(name).map(Some),
		}
	}

	/// Deserializes a scalar argument.
	pub fn scalar<T: DeserializeOwned>(&self, name: &str) -> DiResult<T> {
		match self.value(name)? {
			Value::Scalar(scalar) => serde_json::from_value(scalar.clone()).map_err(|e| {
				DiError::bad_argument(format!("argument ${name} has an unexpected shape: {e}"))
			}),
			other => Err(DiError::bad_argument(format!(
				"argument ${name} is {}, expected a scalar",
				other.describe()
			))),
		}
	}

	/// Returns a variadic argument; a single non-list value is treated as one element.
	pub fn list(&self, name: &str) -> Vec<Value> {
		match self.get(name) {
			Some(Value::List(values)) => values.clone(),
			Some(value) => vec![value.clone()],
			None => Vec::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values
			.iter()
			.map(|(name, value)| (name.as_str(), value))
	}

	/// Converts the arguments back into name-keyed overrides.
	pub fn into_params(self) -> Params {
		self.values.into_iter().collect()
	}
}
