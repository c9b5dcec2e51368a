//! Process-wide default container.
//!
//! Prefer passing a [`Container`] explicitly. The default instance exists for
//! process entry points that cannot; it is set once and never replaced.

use super::Container;
use crate::error::{DiError, DiResult};
use once_cell::sync::OnceCell;

static GLOBAL_CONTAINER: OnceCell<Container> = OnceCell::new();

/// Installs the process-wide container.
///
/// Fails with [`DiError::Logical`] when a container is already installed.
pub fn init_global(container: Container) -> DiResult<()> {
	GLOBAL_CONTAINER
		.set(container)
		.map_err(|_| DiError::logical("the global container is already initialized"))?;
	tracing::debug!("global container initialized");
	Ok(())
}

/// Handle to the process-wide container.
pub fn global() -> DiResult<Container> {
	GLOBAL_CONTAINER
		.get()
		.cloned()
		.ok_or_else(|| DiError::logical("the global container has not been initialized"))
}
