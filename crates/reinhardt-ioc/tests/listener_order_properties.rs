//! Listener ordering properties
//!
//! Property-based tests for the firing order of event listeners.

use parking_lot::Mutex;
use proptest::prelude::*;
use reinhardt_ioc::event::{AfterBuildEvent, ListenerRegistry};
use reinhardt_ioc::reflect::{ClassDescriptor, ClassRegistry};
use reinhardt_ioc::{Container, EventKind, Listener};
use std::sync::Arc;

struct Probe;

fn probe_container() -> Container {
	let registry = ClassRegistry::new();
	registry.register(ClassDescriptor::new("Probe").without_constructor(|_| Ok(Probe)));
	Container::with_reflector(Arc::new(registry))
}

/// Registration indices sorted by priority, ties kept in registration order.
fn expected_order(priorities: &[i32]) -> Vec<usize> {
	let mut order: Vec<usize> = (0..priorities.len()).collect();
	order.sort_by_key(|&index| priorities[index]);
	order
}

// ============================================================================
// Property-Based Tests: listener ordering
// ============================================================================

proptest! {
	/// Test: registry ordering across global and entry listeners
	///
	/// Category: Property
	/// Verifies that merged listeners come out in ascending priority, then
	/// registration order, whichever bucket they were registered in.
	#[test]
	fn prop_registry_orders_by_priority_then_sequence(
		registrations in prop::collection::vec((-20i32..20, any::<bool>()), 0..24)
	) {
		let mut registry = ListenerRegistry::new();
		for (index, (priority, scoped)) in registrations.iter().enumerate() {
			if *scoped {
				registry.add_for_entry("Probe", index, *priority);
			} else {
				registry.add(index, *priority);
			}
		}
		let priorities: Vec<i32> = registrations.iter().map(|(priority, _)| *priority).collect();

		let fired = registry.listeners_for(Some("Probe"));

		prop_assert_eq!(fired, expected_order(&priorities));
	}

	/// Test: container dispatch ordering
	///
	/// Category: Property
	/// Verifies that AfterBuild listeners fire in stable priority order.
	#[test]
	fn prop_after_build_listeners_fire_in_stable_priority_order(
		priorities in prop::collection::vec(-5i32..5, 1..12)
	) {
		let container = probe_container();
		let log = Arc::new(Mutex::new(Vec::new()));
		for (index, priority) in priorities.iter().enumerate() {
			let log = log.clone();
			container
				.on(EventKind::AfterBuild)
				.for_entry("Probe")
				.listen_to_with_priority(
					Listener::after_build(move |_: &mut AfterBuildEvent<'_>| {
						log.lock().push(index);
						Ok(())
					}),
					*priority,
				)
				.unwrap();
		}

		container.get("Probe").unwrap();

		prop_assert_eq!(log.lock().clone(), expected_order(&priorities));
	}

	/// Test: final and earliest priorities bracket registered listeners
	///
	/// Category: Property
	/// Verifies that the computed bounds sit outside every registered priority.
	#[test]
	fn prop_final_and_earliest_priorities_bracket_registrations(
		priorities in prop::collection::vec(-1000i32..1000, 0..16)
	) {
		let mut registry = ListenerRegistry::new();
		for priority in &priorities {
			registry.add((), *priority);
		}

		let (earliest, last) = (registry.earliest_priority(), registry.final_priority());

		prop_assert!(priorities.iter().all(|priority| earliest < *priority && *priority < last));
	}
}
