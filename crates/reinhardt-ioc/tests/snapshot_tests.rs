//! Containers preloaded from a compiled listener snapshot

mod common;

use common::{Wrapped, layers};
use reinhardt_ioc::event::{AfterBuildEvent, RegistrySnapshot};
use reinhardt_ioc::{
	Container, Decorator, DiError, Instance, Listener, ListenerCatalog, ListenerSnapshot,
};
use rstest::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

fn wrapping(layer: &'static str) -> Listener {
	Listener::after_build(move |event: &mut AfterBuildEvent<'_>| {
		event.decorate(Decorator::callable(move |inner: Instance, _: &Container| {
			Ok(Instance::new(
				"Wrapped",
				Wrapped {
					layer: layer.to_string(),
					inner,
				},
			))
		}));
		Ok(())
	})
}

#[fixture]
fn catalog() -> ListenerCatalog {
	ListenerCatalog::new()
		.register("outer", wrapping("outer"))
		.register("inner", wrapping("inner"))
		.register("everywhere", wrapping("everywhere"))
}

#[rstest]
fn test_snapshot_file_preloads_listeners(catalog: ListenerCatalog) {
	// Arrange
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(
		file,
		r#"{{
			"afterBuild": {{
				"listeners": {{ "30": ["everywhere"] }},
				"listenersForEntry": {{ "Circle": {{ "20": ["outer"], "-10": ["inner"] }} }}
			}}
		}}"#
	)
	.unwrap();
	let snapshot = ListenerSnapshot::from_path(file.path()).unwrap();
	let container = Container::builder()
		.reflector(Arc::new(common::registry()))
		.snapshot(snapshot, catalog)
		.build()
		.unwrap();

	// Act
	let circle = container.get("Circle").unwrap();
	let square = container.get("Square").unwrap();

	// Assert
	assert_eq!(
		layers(circle.as_instance().unwrap()),
		vec!["everywhere", "outer", "inner", "Circle"]
	);
	assert_eq!(
		layers(square.as_instance().unwrap()),
		vec!["everywhere", "Square"]
	);
}

#[rstest]
fn test_snapshot_survives_a_json_round_trip(catalog: ListenerCatalog) {
	// Arrange
	let snapshot = ListenerSnapshot {
		after_build: Some(RegistrySnapshot {
			listeners: BTreeMap::new(),
			listeners_for_entry: BTreeMap::from([(
				"Square".to_string(),
				BTreeMap::from([(5, vec!["outer".to_string()])]),
			)]),
		}),
		..Default::default()
	};
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("listeners.json");
	std::fs::write(&path, snapshot.to_json().unwrap()).unwrap();

	// Act
	let loaded = ListenerSnapshot::from_path(&path).unwrap();
	let container = Container::builder()
		.reflector(Arc::new(common::registry()))
		.snapshot(loaded.clone(), catalog)
		.build()
		.unwrap();

	// Assert
	assert_eq!(loaded, snapshot);
	let square = container.get("Square").unwrap();
	assert_eq!(layers(square.as_instance().unwrap()), vec!["outer", "Square"]);
}

#[rstest]
#[case(r#"{ "afterBuild": { "listeners": { "10": ["missing"] } } }"#)]
#[case(r#"{ "beforeBuild": { "listeners": { "10": ["outer"] } } }"#)]
#[case(r#"{ "afterBuild": "#)]
fn test_unusable_snapshots_are_logical_errors(catalog: ListenerCatalog, #[case] json: &str) {
	// Act
	let result = ListenerSnapshot::from_json(json).and_then(|snapshot| {
		Container::builder()
			.reflector(Arc::new(common::registry()))
			.snapshot(snapshot, catalog)
			.build()
	});

	// Assert
	assert!(matches!(result, Err(DiError::Logical(_))));
}

#[rstest]
fn test_missing_snapshot_file_is_a_logical_error() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();

	// Act
	let result = ListenerSnapshot::from_path(dir.path().join("absent.json"));

	// Assert
	assert!(matches!(result, Err(DiError::Logical(_))));
}
