//! Container configuration

use crate::error::{DiError, DiResult};
use serde::{Deserialize, Serialize};

/// Maximum nesting of resolutions before the container gives up.
pub const MAX_RESOLUTION_DEPTH: usize = 100;

/// Behaviour switches for a [`Container`](crate::Container).
///
/// Missing fields take their default, so a partial JSON document is valid:
///
/// ```
/// use reinhardt_ioc::ContainerConfig;
///
/// let config = ContainerConfig::from_json(r#"{ "auto_wiring": false }"#).unwrap();
/// assert!(!config.auto_wiring);
/// assert_eq!(config.max_resolution_depth, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
	/// Build unbound ids as classes of the same name.
	pub auto_wiring: bool,
	/// Nested resolutions allowed before failing.
	pub max_resolution_depth: usize,
	/// Register listeners declared on parameters and classes.
	pub scan_declared_listeners: bool,
}

impl Default for ContainerConfig {
	fn default() -> Self {
		Self {
			auto_wiring: true,
			max_resolution_depth: MAX_RESOLUTION_DEPTH,
			scan_declared_listeners: true,
		}
	}
}

impl ContainerConfig {
	pub fn from_json(json: &str) -> DiResult<Self> {
		serde_json::from_str(json)
			.map_err(|e| DiError::logical(format!("invalid container configuration: {e}")))
	}

	pub fn with_auto_wiring(mut self, enabled: bool) -> Self {
		self.auto_wiring = enabled;
		self
	}

	pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
		self.max_resolution_depth = depth;
		self
	}

	pub fn with_declared_listeners(mut self, enabled: bool) -> Self {
		self.scan_declared_listeners = enabled;
		self
	}
}
