//! Shared fixtures: a small class graph described through a `ClassRegistry`.

#![allow(dead_code)]

use parking_lot::Mutex;
use reinhardt_ioc::reflect::{ClassDescriptor, ClassRegistry, MethodDescriptor, Parameter};
use reinhardt_ioc::{Container, Instance, Value};
use std::sync::Arc;

pub struct Circle {
	pub label: Mutex<String>,
}

pub struct Square;

/// Decorator class: wraps any shape.
pub struct BorderedShape {
	pub inner: Instance,
	pub width: i64,
}

/// Result of a callable decorator.
pub struct Wrapped {
	pub layer: String,
	pub inner: Instance,
}

pub struct FileLogger {
	pub path: String,
}

pub struct NullLogger;

pub struct Report {
	pub logger: Value,
}

pub struct Canvas {
	pub shape: Instance,
}

pub struct Gallery {
	pub shapes: Vec<Value>,
}

pub struct A {
	pub b: Instance,
}

pub struct B {
	pub c: Instance,
}

pub struct Chicken;
pub struct Egg;

pub struct Mailer {
	pub sent: Mutex<Vec<String>>,
}

pub struct Greeter;

pub fn registry() -> ClassRegistry {
	let registry = ClassRegistry::new();
	registry
		.register(ClassDescriptor::interface("Shape"))
		.register(
			ClassDescriptor::new("Circle")
				.implements("Shape")
				.without_constructor(|_| {
					Ok(Circle {
						label: Mutex::new("circle".to_string()),
					})
				}),
		)
		.register(
			ClassDescriptor::new("Square")
				.implements("Shape")
				.without_constructor(|_| Ok(Square)),
		)
		.register(
			ClassDescriptor::new("BorderedShape")
				.implements("Shape")
				.constructor(
					vec![
						Parameter::new("inner").typed("Shape"),
						Parameter::new("width").typed("int").default_value(Value::scalar(1)),
					],
					|args| {
						Ok(BorderedShape {
							inner: args.instance("inner")?,
							width: args.scalar("width")?,
						})
					},
				),
		)
		.register(
			ClassDescriptor::new("UntypedDecorator").constructor(Vec::new(), |_| Ok(Square)),
		)
		.register(ClassDescriptor::interface("Logger"))
		.register(
			ClassDescriptor::new("FileLogger")
				.implements("Logger")
				.constructor(
					vec![Parameter::new("path").typed("string").default_value(Value::scalar("app.log"))],
					|args| {
						Ok(FileLogger {
							path: args.scalar("path")?,
						})
					},
				),
		)
		.register(
			ClassDescriptor::new("NullLogger")
				.implements("Logger")
				.without_constructor(|_| Ok(NullLogger)),
		)
		.register(ClassDescriptor::new("Report").constructor(
			vec![Parameter::new("logger").typed("Logger").nullable()],
			|args| {
				Ok(Report {
					logger: args.value("logger")?.clone(),
				})
			},
		))
		.register(ClassDescriptor::new("Invoice").constructor(
			vec![Parameter::new("logger").typed("Logger").nullable()],
			|args| {
				Ok(Report {
					logger: args.value("logger")?.clone(),
				})
			},
		))
		.register(ClassDescriptor::new("Canvas").constructor(
			vec![Parameter::new("shape").typed("Shape")],
			|args| {
				Ok(Canvas {
					shape: args.instance("shape")?,
				})
			},
		))
		.register(ClassDescriptor::new("Gallery").constructor(
			vec![Parameter::new("shapes").typed("Shape").variadic()],
			|args| {
				Ok(Gallery {
					shapes: args.list("shapes"),
				})
			},
		))
		.register(ClassDescriptor::new("A").constructor(
			vec![Parameter::new("b").typed("B")],
			|args| Ok(A { b: args.instance("b")? }),
		))
		.register(ClassDescriptor::new("B").constructor(
			vec![Parameter::new("c").typed("C")],
			|args| Ok(B { c: args.instance("c")? }),
		))
		.register(ClassDescriptor::interface("C"))
		.register(ClassDescriptor::new("Chicken").constructor(
			vec![Parameter::new("egg").typed("Egg")],
			|_| Ok(Chicken),
		))
		.register(ClassDescriptor::new("Egg").constructor(
			vec![Parameter::new("chicken").typed("Chicken")],
			|_| Ok(Egg),
		))
		.register(
			ClassDescriptor::new("Mailer")
				.without_constructor(|_| {
					Ok(Mailer {
						sent: Mutex::new(Vec::new()),
					})
				})
				.method(MethodDescriptor::new(
					"send",
					vec![
						Parameter::new("to").typed("string"),
						Parameter::new("logger").typed("Logger").nullable(),
					],
					|target, args| {
						let mailer = target
							.downcast_ref::<Mailer>()
							.ok_or_else(|| reinhardt_ioc::DiError::bad_argument("not a mailer"))?;
						let to: String = args.scalar("to")?;
						mailer.sent.lock().push(to.clone());
						let logged = !args.value("logger")?.is_null();
						Ok(Value::scalar(serde_json::json!({ "to": to, "logged": logged })))
					},
				)),
		)
		.register(
			ClassDescriptor::new("Greeter")
				.without_constructor(|_| Ok(Greeter))
				.method(MethodDescriptor::new(
					"invoke",
					vec![Parameter::new("name").typed("string").default_value(Value::scalar("world"))],
					|_, args| {
						let name: String = args.scalar("name")?;
						Ok(Value::scalar(format!("hello {name}")))
					},
				)),
		);
	registry
}

pub fn container() -> Container {
	Container::with_reflector(Arc::new(registry()))
}

/// Peels callable decorator layers, outermost first.
pub fn layers(instance: &Instance) -> Vec<String> {
	let mut layers = Vec::new();
	let mut current = instance.clone();
	while let Some(wrapped) = current.downcast::<Wrapped>() {
		layers.push(wrapped.layer.clone());
		current = wrapped.inner.clone();
	}
	layers.push(current.class().to_string());
	layers
}
