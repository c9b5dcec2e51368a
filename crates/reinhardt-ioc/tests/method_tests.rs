//! Method, function and closure invocation with injected arguments

mod common;

use common::{Mailer, container};
use reinhardt_ioc::reflect::{ClassRegistry, FunctionDescriptor, Parameter};
use reinhardt_ioc::{CallableRef, Container, DiError, Params, Value};
use rstest::*;
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn shapes() -> Container {
	container()
}

#[rstest]
fn test_named_method_receives_explicit_and_injected_arguments(shapes: Container) {
	// Act
	let result = shapes
		.call_str("Mailer::send", Params::new().with("to", Value::scalar("ops@example.com")))
		.unwrap();

	// Assert
	assert_eq!(
		result.as_scalar(),
		Some(&json!({ "to": "ops@example.com", "logged": false }))
	);
}

#[rstest]
fn test_contextual_binding_scoped_to_a_method(shapes: Container) {
	// Arrange
	shapes
		.when("Mailer::send")
		.needs("Logger")
		.give_class("NullLogger")
		.unwrap();

	// Act
	let result = shapes
		.call_str("Mailer::send", Params::new().with("to", Value::scalar("ops@example.com")))
		.unwrap();

	// Assert
	assert_eq!(result.as_scalar().unwrap()["logged"], json!(true));
}

#[rstest]
fn test_bound_method_runs_on_the_given_object(shapes: Container) {
	// Arrange
	let mailer = shapes.get("Mailer").unwrap().into_instance().unwrap();
	let callable = CallableRef::bound(mailer.clone(), "send");

	// Act
	shapes
		.call(&callable, Params::new().with("to", Value::scalar("a@example.com")), None)
		.unwrap();

	// Assert
	let sent = mailer.downcast_ref::<Mailer>().unwrap().sent.lock().clone();
	assert_eq!(sent, vec!["a@example.com"]);
}

#[rstest]
fn test_method_binding_takes_precedence(shapes: Container) {
	// Arrange
	shapes.bind_method("Mailer::send", |target, arguments, _| {
		let to: String = arguments.scalar("to")?;
		Ok(Value::scalar(format!("{} queued {to}", target.class())))
	});

	// Act
	let result = shapes
		.call_str("Mailer::send", Params::new().with("to", Value::scalar("b@example.com")))
		.unwrap();

	// Assert
	assert!(shapes.has_method_binding("Mailer::send"));
	assert_eq!(result.as_scalar(), Some(&json!("Mailer queued b@example.com")));
}

#[rstest]
#[case(Params::new(), "hello world")]
#[case(Params::new().with("name", Value::scalar("reinhardt")), "hello reinhardt")]
fn test_invocable_class_is_called_through_its_default_method(
	shapes: Container,
	#[case] params: Params,
	#[case] expected: &str,
) {
	// Act
	let result = shapes.call_str("Greeter", params).unwrap();

	// Assert
	assert_eq!(result.as_scalar(), Some(&json!(expected)));
}

#[rstest]
fn test_closure_parameters_are_injected(shapes: Container) {
	// Arrange
	shapes.bind("Shape", "Square").unwrap();
	let callable = CallableRef::lambda(vec![Parameter::new("shape").typed("Shape")], |arguments| {
		Ok(Value::scalar(arguments.instance("shape")?.class()))
	});

	// Act
	let result = shapes.call(&callable, Params::new(), None).unwrap();

	// Assert
	assert_eq!(result.as_scalar(), Some(&json!("Square")));
}

#[rstest]
fn test_registered_function_is_called() {
	// Arrange
	let registry: ClassRegistry = common::registry();
	registry.register_function(FunctionDescriptor::new(
		"describe_shape",
		vec![
			Parameter::new("shape").typed("Shape"),
			Parameter::new("prefix").typed("string").default_value(Value::scalar("a")),
		],
		|arguments| {
			let prefix: String = arguments.scalar("prefix")?;
			Ok(Value::scalar(format!(
				"{prefix} {}",
				arguments.instance("shape")?.class()
			)))
		},
	));
	let container = Container::with_reflector(Arc::new(registry));
	container.bind("Shape", "Circle").unwrap();

	// Act
	let result = container.call_str("describe_shape", Params::new()).unwrap();

	// Assert
	assert_eq!(result.as_scalar(), Some(&json!("a Circle")));
}

#[rstest]
#[case("Mailer#7::send")]
#[case("Mailer::missing")]
#[case("no_such_function")]
fn test_unusable_callables_are_bad_arguments(shapes: Container, #[case] callable: &str) {
	// Act
	let result = shapes.call_str(callable, Params::new());

	// Assert
	assert!(
		matches!(result, Err(DiError::BadResolverArgument(_))),
		"{callable}: {result:?}"
	);
}
