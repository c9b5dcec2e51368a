//! Build lifecycle events.
//!
//! Three events bracket every object construction:
//!
//! - [`BeforeBuildEvent`]: before an entry is built; may replace its parameters
//! - [`BuildingEvent`]: while one typed constructor parameter is resolved; may
//!   supply its value
//! - [`AfterBuildEvent`]: after the object exists; may decorate or update it
//!
//! Each kind has its own [`ListenerRegistry`]. Listeners are registered through
//! [`Container::on`](crate::Container::on), loaded from a [`ListenerSnapshot`],
//! or declared on class and parameter descriptors.

mod after_build;
mod before_build;
mod builder;
mod building;
mod registry;
mod snapshot;

pub use after_build::{AfterBuildEvent, Decorator, DecoratorFn, UpdaterFn};
pub use before_build::BeforeBuildEvent;
pub use builder::EventListenerBuilder;
pub use building::BuildingEvent;
pub use registry::ListenerRegistry;
pub use snapshot::{ListenerCatalog, ListenerSnapshot, RegistrySnapshot};

use crate::error::DiResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Priority given to listeners, decorators and updaters when none is specified.
pub const DEFAULT_PRIORITY: i32 = 10;

pub type BeforeBuildListener =
	Arc<dyn Fn(&mut BeforeBuildEvent<'_>) -> DiResult<()> + Send + Sync>;

pub type BuildingListener = Arc<dyn Fn(&mut BuildingEvent<'_>) -> DiResult<()> + Send + Sync>;

pub type AfterBuildListener = Arc<dyn Fn(&mut AfterBuildEvent<'_>) -> DiResult<()> + Send + Sync>;

/// The three lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
	BeforeBuild,
	Building,
	AfterBuild,
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::BeforeBuild => "BeforeBuild",
			Self::Building => "Building",
			Self::AfterBuild => "AfterBuild",
		};
		f.write_str(name)
	}
}

/// A listener of any kind.
#[derive(Clone)]
pub enum Listener {
	BeforeBuild(BeforeBuildListener),
	Building(BuildingListener),
	AfterBuild(AfterBuildListener),
}

impl Listener {
	pub fn before_build<F>(listener: F) -> Self
	where
		F: Fn(&mut BeforeBuildEvent<'_>) -> DiResult<()> + Send + Sync + 'static,
	{
		Self::BeforeBuild(Arc::new(listener))
	}

	pub fn building<F>(listener: F) -> Self
	where
		F: Fn(&mut BuildingEvent<'_>) -> DiResult<()> + Send + Sync + 'static,
	{
		Self::Building(Arc::new(listener))
	}

	pub fn after_build<F>(listener: F) -> Self
	where
		F: Fn(&mut AfterBuildEvent<'_>) -> DiResult<()> + Send + Sync + 'static,
	{
		Self::AfterBuild(Arc::new(listener))
	}

	pub fn kind(&self) -> EventKind {
		match self {
			Self::BeforeBuild(_) => EventKind::BeforeBuild,
			Self::Building(_) => EventKind::Building,
			Self::AfterBuild(_) => EventKind::AfterBuild,
		}
	}
}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Listener({})", self.kind())
	}
}

/// The three registries owned by a container.
#[derive(Default)]
pub(crate) struct EventListeners {
	pub(crate) before_build: ListenerRegistry<BeforeBuildListener>,
	pub(crate) building: ListenerRegistry<BuildingListener>,
	pub(crate) after_build: ListenerRegistry<AfterBuildListener>,
}

impl EventListeners {
	/// Routes a listener to the registry of its kind.
	pub(crate) fn add(&mut self, listener: Listener, entry: Option<String>, priority: i32) {
		match (listener, entry) {
			(Listener::BeforeBuild(l), None) => self.before_build.add(l, priority),
			(Listener::BeforeBuild(l), Some(e)) => self.before_build.add_for_entry(e, l, priority),
			(Listener::Building(l), None) => self.building.add(l, priority),
			(Listener::Building(l), Some(e)) => self.building.add_for_entry(e, l, priority),
			(Listener::AfterBuild(l), None) => self.after_build.add(l, priority),
			(Listener::AfterBuild(l), Some(e)) => self.after_build.add_for_entry(e, l, priority),
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.before_build.len() + self.building.len() + self.after_build.len()
	}

	pub(crate) fn clear(&mut self) {
		self.before_build.clear();
		self.building.clear();
		self.after_build.clear();
	}
}
