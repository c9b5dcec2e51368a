//! Container construction

use super::Container;
use crate::config::ContainerConfig;
use crate::error::DiResult;
use crate::event::{EventListeners, ListenerCatalog, ListenerSnapshot};
use crate::reflect::{ClassRegistry, DeclaredListenerSource, DescriptorListeners, Reflector};
use std::sync::Arc;

/// Builder for [`Container`].
///
/// ```
/// use reinhardt_ioc::{ContainerBuilder, ContainerConfig};
///
/// let container = ContainerBuilder::new()
///     .config(ContainerConfig::default().with_auto_wiring(false))
///     .build()
///     .unwrap();
/// assert!(container.get("Anything").unwrap_err().is_not_found());
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
	config: ContainerConfig,
	reflector: Option<Arc<dyn Reflector>>,
	declared: Option<Arc<dyn DeclaredListenerSource>>,
	snapshot: Option<(ListenerSnapshot, ListenerCatalog)>,
}

impl ContainerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn config(mut self, config: ContainerConfig) -> Self {
		self.config = config;
		self
	}

	pub fn reflector(mut self, reflector: Arc<dyn Reflector>) -> Self {
		self.reflector = Some(reflector);
		self
	}

	/// Replaces the source of declared listeners (defaults to the descriptors).
	pub fn declared_listeners(mut self, source: Arc<dyn DeclaredListenerSource>) -> Self {
		self.declared = Some(source);
		self
	}

	/// Preloads the listener registries from a compiled snapshot.
	///
	/// Declared-listener scanning is disabled for containers built this way.
	pub fn snapshot(mut self, snapshot: ListenerSnapshot, catalog: ListenerCatalog) -> Self {
		self.snapshot = Some((snapshot, catalog));
		self
	}

	pub fn build(self) -> DiResult<Container> {
		let reflector = self
			.reflector
			.unwrap_or_else(|| Arc::new(ClassRegistry::new()));
		let (listeners, declared) = match self.snapshot {
			Some((snapshot, catalog)) => (snapshot.into_listeners(&catalog)?, None),
			None => (
				EventListeners::default(),
				Some(
					self.declared
						.unwrap_or_else(|| Arc::new(DescriptorListeners)),
				),
			),
		};
		tracing::debug!(
			config = ?self.config,
			preloaded_listeners = listeners.len(),
			scan_declared = declared.is_some() && self.config.scan_declared_listeners,
			"building container"
		);
		Ok(Container::from_parts(
			self.config,
			reflector,
			declared,
			listeners,
		))
	}
}
