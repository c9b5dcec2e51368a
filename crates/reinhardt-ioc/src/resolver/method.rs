//! Callable references and their invocation.
//!
//! Every callable shape is normalized into a [`CallableRef`]. Its canonical
//! key (`Class::method`, a function name, or a closure id) is the lookup key
//! for method bindings and the scope of contextual bindings for the call.

use super::ParamResolver;
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::reflect::{FunctionFn, Parameter};
use crate::value::{Arguments, Instance, Params, Value};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Method invoked when a callable names a class but no method.
pub const DEFAULT_METHOD: &str = "invoke";

static NEXT_LAMBDA_ID: AtomicU64 = AtomicU64::new(1);

/// An anonymous callable with declared parameters.
#[derive(Clone)]
pub struct Lambda {
	id: String,
	params: Vec<Parameter>,
	handler: FunctionFn,
}

impl Lambda {
	pub fn new<F>(params: Vec<Parameter>, handler: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		let id = format!("{{closure#{}}}", NEXT_LAMBDA_ID.fetch_add(1, Ordering::Relaxed));
		Self {
			id,
			params,
			handler: Arc::new(handler),
		}
	}

	/// Opaque id, unique per closure.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn params(&self) -> &[Parameter] {
		&self.params
	}
}

/// A reference to something the container can call.
#[derive(Clone)]
pub enum CallableRef {
	/// `Class::method`; the class is resolved through the container.
	Named { class: String, method: Option<String> },
	/// A method of an object that already exists.
	Bound { instance: Instance, method: Option<String> },
	/// A free function (or an invocable class) registered with the reflector.
	Function(String),
	Lambda(Lambda),
}

impl CallableRef {
	/// Parses `"Class::method"` or `"function"`.
	///
	/// `"Class#id::method"` names a method of an already instantiated object,
	/// which cannot be rebuilt from a string and is rejected.
	pub fn parse(callable: &str) -> DiResult<Self> {
		match callable.split_once("::") {
			Some((class, _)) if class.contains('#') => Err(DiError::bad_argument(format!(
				"[{callable}] refers to an already instantiated object and cannot be resolved lazily"
			))),
			Some((class, method)) if !class.is_empty() && !method.is_empty() => Ok(Self::Named {
				class: class.to_string(),
				method: Some(method.to_string()),
			}),
			Some(_) => Err(DiError::bad_argument(format!(
				"[{callable}] is not a valid callable"
			))),
			None if callable.is_empty() => Err(DiError::bad_argument("empty callable reference")),
			None => Ok(Self::Function(callable.to_string())),
		}
	}

	pub fn named(class: impl Into<String>, method: impl Into<String>) -> Self {
		Self::Named {
			class: class.into(),
			method: Some(method.into()),
		}
	}

	pub fn bound(instance: Instance, method: impl Into<String>) -> Self {
		Self::Bound {
			instance,
			method: Some(method.into()),
		}
	}

	/// An invocable object: its `invoke` method is called.
	pub fn invocable(instance: Instance) -> Self {
		Self::Bound {
			instance,
			method: None,
		}
	}

	pub fn lambda<F>(params: Vec<Parameter>, handler: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self::Lambda(Lambda::new(params, handler))
	}

	/// Canonical key, with `method` used when the reference names none.
	pub fn key(&self, method: Option<&str>) -> String {
		match self {
			Self::Named { class, method: own } => {
				format!("{class}::{}", pick_method(own.as_deref(), method))
			}
			Self::Bound { instance, method: own } => {
				format!("{}::{}", instance.class(), pick_method(own.as_deref(), method))
			}
			Self::Function(name) => name.clone(),
			Self::Lambda(lambda) => lambda.id.clone(),
		}
	}
}

impl fmt::Display for CallableRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Named { class, method } => {
				write!(f, "{class}::{}", pick_method(method.as_deref(), None))
			}
			Self::Bound { instance, method } => write!(
				f,
				"{}#{}::{}",
				instance.class(),
				instance.object_id(),
				pick_method(method.as_deref(), None)
			),
			Self::Function(name) => f.write_str(name),
			Self::Lambda(lambda) => f.write_str(&lambda.id),
		}
	}
}

impl fmt::Debug for CallableRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CallableRef({self})")
	}
}

impl From<Lambda> for CallableRef {
	fn from(lambda: Lambda) -> Self {
		Self::Lambda(lambda)
	}
}

fn pick_method<'a>(own: Option<&'a str>, fallback: Option<&'a str>) -> &'a str {
	own.or(fallback).unwrap_or(DEFAULT_METHOD)
}

/// Resolves and invokes callables.
pub(crate) struct MethodResolver<'c> {
	container: &'c Container,
}

impl<'c> MethodResolver<'c> {
	pub(crate) fn new(container: &'c Container) -> Self {
		Self { container }
	}

	pub(crate) fn call(
		&self,
		callable: &CallableRef,
		params: &Params,
		method: Option<&str>,
	) -> DiResult<Value> {
		tracing::debug!(callable = %callable, "calling");
		match callable {
			CallableRef::Named { class, method: own } => {
				let method = pick_method(own.as_deref(), method);
				let instance = self
					.container
					.get(class)?
					.into_instance()
					.ok_or_else(|| {
						DiError::bad_argument(format!(
							"[{class}] did not resolve to an object, cannot call {method}()"
						))
					})?;
				self.invoke_method(&self.container.canonical_id(class), instance, method, params)
			}
			CallableRef::Bound { instance, method: own } => {
				let method = pick_method(own.as_deref(), method);
				self.invoke_method(instance.class(), instance.clone(), method, params)
			}
			CallableRef::Function(name) => self.call_function(name, params, method),
			CallableRef::Lambda(lambda) => {
				let arguments =
					ParamResolver::new(self.container, &lambda.id, None).resolve(&lambda.params, params)?;
				(lambda.handler)(arguments).map_err(|e| self.container.normalize(e))
			}
		}
	}

	fn call_function(&self, name: &str, params: &Params, method: Option<&str>) -> DiResult<Value> {
		let reflector = self.container.reflector();
		if let Some(function) = reflector.function(name) {
			let arguments = ParamResolver::new(self.container, name, None).resolve(function.params(), params)?;
			return function
				.invoke(arguments)
				.map_err(|e| self.container.normalize(e));
		}
		if self.container.has(name) {
			let invocable = CallableRef::Named {
				class: name.to_string(),
				method: None,
			};
			return self.call(&invocable, params, method);
		}
		Err(DiError::bad_argument(format!(
			"[{name}] is neither a function nor an invocable class"
		)))
	}

	fn invoke_method(
		&self,
		class: &str,
		instance: Instance,
		method: &str,
		params: &Params,
	) -> DiResult<Value> {
		let key = format!("{class}::{method}");
		let reflector = self.container.reflector();
		let descriptor = reflector
			.class(instance.class())
			.or_else(|| reflector.class(class));
		let method_descriptor = descriptor
			.as_ref()
			.and_then(|descriptor| descriptor.get_method(method));

		let binding = self
			.container
			.inner()
			.method_bindings
			.read()
			.get(&key)
			.cloned();
		if let Some(binding) = binding {
			tracing::debug!(key = %key, "using method binding");
			let arguments = match method_descriptor {
				Some(found) => ParamResolver::new(self.container, &key, None).resolve(found.params(), params)?,
				None => params.iter().fold(Arguments::new(), |arguments, (name, value)| {
					arguments.with(name, value.clone())
				}),
			};
			return binding(&instance, arguments, self.container)
				.map_err(|e| self.container.normalize(e));
		}

		let found = method_descriptor.ok_or_else(|| {
			DiError::bad_argument(format!("method [{key}] does not exist"))
		})?;
		let arguments = ParamResolver::new(self.container, &key, None).resolve(found.params(), params)?;
		found
			.invoke(&instance, arguments)
			.map_err(|e| self.container.normalize(e))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Mailer::send", "Mailer::send")]
	#[case("Mailer", "Mailer")]
	fn test_parse_and_key(#[case] input: &str, #[case] key: &str) {
		// Act
		let callable = CallableRef::parse(input).unwrap();

		// Assert
		assert_eq!(callable.key(None), key);
	}

	#[rstest]
	#[case("Mailer#42::send")]
	#[case("::send")]
	#[case("Mailer::")]
	#[case("")]
	fn test_parse_rejects_unusable_references(#[case] input: &str) {
		let result = CallableRef::parse(input);

		assert!(matches!(result, Err(DiError::BadResolverArgument(_))));
	}

	#[rstest]
	fn test_bound_display_carries_the_object_id() {
		// Arrange
		let instance = Instance::new("Mailer", ());
		let callable = CallableRef::invocable(instance.clone());

		// Act
		let rendered = callable.to_string();

		// Assert
		assert_eq!(rendered, format!("Mailer#{}::invoke", instance.object_id()));
		assert_eq!(callable.key(None), "Mailer::invoke");
		assert_eq!(callable.key(Some("send")), "Mailer::send");
	}

	#[rstest]
	fn test_lambda_ids_are_unique() {
		let first = Lambda::new(Vec::new(), |_| Ok(Value::null()));
		let second = Lambda::new(Vec::new(), |_| Ok(Value::null()));

		assert_ne!(first.id(), second.id());
	}
}
