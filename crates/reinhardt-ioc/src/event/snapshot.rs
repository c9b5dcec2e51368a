//! Compiled listener tables.
//!
//! A snapshot is a plain JSON document listing listener names per priority,
//! optionally per entry:
//!
//! ```json
//! {
//!   "afterBuild": {
//!     "listeners": { "10": ["audit"] },
//!     "listenersForEntry": { "Shape": { "-10": ["border"] } }
//!   }
//! }
//! ```
//!
//! Names are looked up in a [`ListenerCatalog`]. Registries built from a
//! snapshot skip declared-listener scanning.

use super::{EventKind, EventListeners, Listener};
use crate::error::{DiError, DiResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Listener names of one registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrySnapshot {
	pub listeners: BTreeMap<i32, Vec<String>>,
	pub listeners_for_entry: BTreeMap<String, BTreeMap<i32, Vec<String>>>,
}

impl RegistrySnapshot {
	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty() && self.listeners_for_entry.is_empty()
	}
}

/// Listener names of all three registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListenerSnapshot {
	pub before_build: Option<RegistrySnapshot>,
	pub building: Option<RegistrySnapshot>,
	pub after_build: Option<RegistrySnapshot>,
}

impl ListenerSnapshot {
	pub fn from_json(json: &str) -> DiResult<Self> {
		serde_json::from_str(json)
			.map_err(|e| DiError::logical(format!("invalid listener snapshot: {e}")))
	}

	pub fn from_path(path: impl AsRef<Path>) -> DiResult<Self> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path).map_err(|e| {
			DiError::logical(format!(
				"cannot read listener snapshot {}: {e}",
				path.display()
			))
		})?;
		Self::from_json(&json)
	}

	pub fn to_json(&self) -> DiResult<String> {
		serde_json::to_string_pretty(self)
			.map_err(|e| DiError::logical(format!("cannot serialize listener snapshot: {e}")))
	}

	/// Builds the three registries, resolving names through `catalog`.
	pub(crate) fn into_listeners(self, catalog: &ListenerCatalog) -> DiResult<EventListeners> {
		let mut listeners = EventListeners::default();
		let registries = [
			(EventKind::BeforeBuild, self.before_build),
			(EventKind::Building, self.building),
			(EventKind::AfterBuild, self.after_build),
		];
		for (kind, registry) in registries {
			let Some(registry) = registry else {
				continue;
			};
			if registry.is_empty() {
				tracing::warn!(kind = %kind, "ignoring empty listener snapshot section");
				continue;
			}
			for (priority, names) in &registry.listeners {
				for name in names {
					listeners.add(catalog.lookup(kind, name)?, None, *priority);
				}
			}
			for (entry, buckets) in &registry.listeners_for_entry {
				for (priority, names) in buckets {
					for name in names {
						listeners.add(catalog.lookup(kind, name)?, Some(entry.clone()), *priority);
					}
				}
			}
		}
		Ok(listeners)
	}
}

/// Named listeners available to snapshots.
#[derive(Debug, Clone, Default)]
pub struct ListenerCatalog {
	listeners: HashMap<String, Listener>,
}

impl ListenerCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(mut self, name: impl Into<String>, listener: Listener) -> Self {
		self.insert(name, listener);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, listener: Listener) {
		self.listeners.insert(name.into(), listener);
	}

	pub fn get(&self, name: &str) -> Option<&Listener> {
		self.listeners.get(name)
	}

	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}

	fn lookup(&self, kind: EventKind, name: &str) -> DiResult<Listener> {
		let listener = self
			.get(name)
			.ok_or_else(|| DiError::logical(format!("unknown listener '{name}' in {kind} snapshot")))?;
		if listener.kind() != kind {
			return Err(DiError::logical(format!(
				"listener '{name}' is a {} listener and cannot be loaded into the {kind} registry",
				listener.kind()
			)));
		}
		Ok(listener.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn catalog() -> ListenerCatalog {
		ListenerCatalog::new()
			.register("audit", Listener::after_build(|_| Ok(())))
			.register("border", Listener::after_build(|_| Ok(())))
			.register("override", Listener::before_build(|_| Ok(())))
	}

	#[rstest]
	fn test_snapshot_parses_camel_case_sections() {
		// Arrange
		let json = r#"{
			"afterBuild": {
				"listeners": { "10": ["audit"] },
				"listenersForEntry": { "Shape": { "-10": ["border"] } }
			}
		}"#;

		// Act
		let snapshot = ListenerSnapshot::from_json(json).unwrap();

		// Assert
		let after_build = snapshot.after_build.as_ref().unwrap();
		assert_eq!(after_build.listeners[&10], vec!["audit".to_string()]);
		assert_eq!(
			after_build.listeners_for_entry["Shape"][&-10],
			vec!["border".to_string()]
		);
		assert!(snapshot.before_build.is_none());
	}

	#[rstest]
	fn test_snapshot_loads_into_registries() {
		// Arrange
		let snapshot = ListenerSnapshot::from_json(
			r#"{ "afterBuild": { "listeners": { "10": ["audit"] }, "listenersForEntry": { "Shape": { "-10": ["border"] } } } }"#,
		)
		.unwrap();

		// Act
		let listeners = snapshot.into_listeners(&catalog()).unwrap();

		// Assert
		assert_eq!(listeners.after_build.len(), 2);
		assert_eq!(listeners.after_build.bounds(), (-10, 10));
		assert!(listeners.before_build.is_empty());
	}

	#[rstest]
	#[case(r#"{ "building": { "listeners": { "10": ["missing"] } } }"#)]
	#[case(r#"{ "building": { "listeners": { "10": ["audit"] } } }"#)]
	fn test_unknown_or_mismatched_names_are_rejected(#[case] json: &str) {
		// Arrange
		let snapshot = ListenerSnapshot::from_json(json).unwrap();

		// Act
		let result = snapshot.into_listeners(&catalog());

		// Assert
		assert!(matches!(result, Err(DiError::Logical(_))));
	}

	#[rstest]
	fn test_snapshot_round_trips_through_json() {
		// Arrange
		let mut snapshot = ListenerSnapshot::default();
		let mut before_build = RegistrySnapshot::default();
		before_build.listeners.insert(5, vec!["override".to_string()]);
		snapshot.before_build = Some(before_build);

		// Act
		let parsed = ListenerSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

		// Assert
		assert_eq!(parsed, snapshot);
	}
}
