//! Priority-ordered, entry-scoped listener storage

use super::DEFAULT_PRIORITY;
use std::collections::{BTreeMap, HashMap};

struct Registered<L> {
	sequence: u64,
	listener: L,
}

type PriorityBuckets<L> = BTreeMap<i32, Vec<Registered<L>>>;

/// Listener storage for one event kind.
///
/// Listeners are either unscoped (fired for every dispatch) or scoped to an
/// entry (fired only when that entry is dispatched). Lower priorities fire
/// first; within one priority, listeners fire in registration order, across
/// both partitions.
///
/// The registry tracks the lowest and highest priorities seen so far, which
/// declared listeners use to place themselves ahead of, or behind, everything
/// registered by users.
pub struct ListenerRegistry<L> {
	listeners: PriorityBuckets<L>,
	listeners_for_entry: HashMap<String, PriorityBuckets<L>>,
	low: i32,
	high: i32,
	sequence: u64,
}

impl<L: Clone> ListenerRegistry<L> {
	pub fn new() -> Self {
		Self {
			listeners: BTreeMap::new(),
			listeners_for_entry: HashMap::new(),
			low: DEFAULT_PRIORITY,
			high: DEFAULT_PRIORITY,
			sequence: 0,
		}
	}

	/// Registers an unscoped listener.
	pub fn add(&mut self, listener: L, priority: i32) {
		let registered = self.register(listener, priority);
		self.listeners.entry(priority).or_default().push(registered);
	}

	/// Registers a listener scoped to `entry`.
	pub fn add_for_entry(&mut self, entry: impl Into<String>, listener: L, priority: i32) {
		let registered = self.register(listener, priority);
		self.listeners_for_entry
			.entry(entry.into())
			.or_default()
			.entry(priority)
			.or_default()
			.push(registered);
	}

	/// Priority that runs after every listener registered so far.
	pub fn final_priority(&self) -> i32 {
		self.high.saturating_add(1)
	}

	/// Priority that runs before every listener registered so far.
	pub fn earliest_priority(&self) -> i32 {
		self.low.saturating_sub(1)
	}

	/// Lowest and highest priorities seen so far.
	pub fn bounds(&self) -> (i32, i32) {
		(self.low, self.high)
	}

	/// Listeners to fire for `entry` (unscoped ones included), in firing order.
	pub fn listeners_for(&self, entry: Option<&str>) -> Vec<L> {
		self.listeners_for_entries(entry.as_slice())
	}

	/// Listeners to fire for any of `entries` (unscoped ones included), in
	/// firing order.
	pub fn listeners_for_entries(&self, entries: &[&str]) -> Vec<L> {
		let scoped = entries
			.iter()
			.filter_map(|entry| self.listeners_for_entry.get(*entry))
			.flatten();
		let mut ordered: Vec<(i32, u64, &L)> = self
			.listeners
			.iter()
			.chain(scoped)
			.flat_map(|(priority, bucket)| {
				bucket
					.iter()
					.map(move |registered| (*priority, registered.sequence, &registered.listener))
			})
			.collect();
		ordered.sort_by_key(|(priority, sequence, _)| (*priority, *sequence));
		ordered.dedup_by_key(|(_, sequence, _)| *sequence);
		ordered
			.into_iter()
			.map(|(_, _, listener)| listener.clone())
			.collect()
	}

	/// Total number of registered listeners.
	pub fn len(&self) -> usize {
		let unscoped: usize = self.listeners.values().map(Vec::len).sum();
		let scoped: usize = self
			.listeners_for_entry
			.values()
			.flat_map(BTreeMap::values)
			.map(Vec::len)
			.sum();
		unscoped + scoped
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every listener and resets the priority bounds.
	pub fn clear(&mut self) {
		self.listeners.clear();
		self.listeners_for_entry.clear();
		self.low = DEFAULT_PRIORITY;
		self.high = DEFAULT_PRIORITY;
	}

	fn register(&mut self, listener: L, priority: i32) -> Registered<L> {
		self.low = self.low.min(priority);
		self.high = self.high.max(priority);
		self.sequence += 1;
		Registered {
			sequence: self.sequence,
			listener,
		}
	}
}

impl<L: Clone> Default for ListenerRegistry<L> {
	fn default() -> Self {
		Self::new()
	}
}
