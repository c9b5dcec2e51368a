//! BeforeBuild event: fired before an entry is constructed

use super::BeforeBuildListener;
use crate::container::Container;
use crate::error::DiResult;
use crate::value::Params;

/// Event fired before an entry is constructed.
///
/// Listeners may inspect or replace the parameter overrides the entry is
/// about to be built with.
pub struct BeforeBuildEvent<'c> {
	container: &'c Container,
	id: String,
	params: Params,
	stopped: bool,
}

impl<'c> BeforeBuildEvent<'c> {
	pub(crate) fn new(container: &'c Container, id: impl Into<String>, params: Params) -> Self {
		Self {
			container,
			id: id.into(),
			params,
			stopped: false,
		}
	}

	pub fn container(&self) -> &'c Container {
		self.container
	}

	/// Entry about to be built.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	pub fn params_mut(&mut self) -> &mut Params {
		&mut self.params
	}

	/// Replaces the whole parameter set.
	pub fn set_params(&mut self, params: Params) {
		self.params = params;
	}

	/// Prevents listeners that have not run yet from running.
	pub fn stop_propagation(&mut self) {
		self.stopped = true;
	}

	pub fn is_propagation_stopped(&self) -> bool {
		self.stopped
	}

	pub(crate) fn dispatch(&mut self, listeners: &[BeforeBuildListener]) -> DiResult<()> {
		for listener in listeners {
			if self.stopped {
				break;
			}
			listener(&mut *self)?;
		}
		Ok(())
	}

	pub(crate) fn into_params(self) -> Params {
		self.params
	}
}
