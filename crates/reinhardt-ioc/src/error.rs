//! Container error types.
//!
//! Every failure surfaced by the container is a [`DiError`]. All variants except
//! [`DiError::Other`] are "container exceptions": they pass through nested
//! resolutions untouched, while arbitrary user failures are normalized into
//! [`DiError::Container`] before they leave `get()` or `call()`.

use thiserror::Error;

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;

/// Container errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiError {
	/// No binding, alias or reflectable class exists for the identifier.
	#[error("no entry was found for '{0}'")]
	NotFound(String),

	/// Construction or reflection failure, carrying the artefact trail.
	#[error("{}{}", .message, render_trail(.trail))]
	Container {
		/// Failure description.
		message: String,
		/// Classes under construction when the failure happened.
		trail: Vec<String>,
	},

	/// A class was requested while it was already being constructed.
	#[error("circular dependency detected while building {class}: {path}")]
	CircularDependency {
		/// Class that closed the cycle.
		class: String,
		/// Rendered cycle (format: A -> B -> A).
		path: String,
	},

	/// A callable, decorator or bound parameter value is unusable.
	#[error("{0}")]
	BadResolverArgument(String),

	/// Programmer misuse of the container API.
	#[error("{0}")]
	Logical(String),

	/// Failure raised by user code (factories, constructors, listeners).
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl DiError {
	/// Builds a [`DiError::Container`] from a message and an artefact trail.
	pub fn container(message: impl Into<String>, trail: Vec<String>) -> Self {
		Self::Container {
			message: message.into(),
			trail,
		}
	}

	/// Builds a [`DiError::BadResolverArgument`].
	pub fn bad_argument(message: impl Into<String>) -> Self {
		Self::BadResolverArgument(message.into())
	}

	/// Builds a [`DiError::Logical`].
	pub fn logical(message: impl Into<String>) -> Self {
		Self::Logical(message.into())
	}

	/// Whether the error belongs to the container's own vocabulary.
	///
	/// Such errors are propagated unchanged; anything else is wrapped into
	/// [`DiError::Container`] at the resolution boundary.
	pub fn is_container_exception(&self) -> bool {
		!matches!(self, Self::Other(_))
	}

	/// Whether the error reports a missing entry.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}

	/// Artefact trail attached to the error, if any.
	pub fn trail(&self) -> &[String] {
		match self {
			Self::Container { trail, .. } => trail,
			_ => &[],
		}
	}
}

fn render_trail(trail: &[String]) -> String {
	if trail.is_empty() {
		String::new()
	} else {
		format!(" while building [{}]", trail.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_container_error_renders_trail() {
		// Arrange
		let error = DiError::container(
			"unresolvable dependency $c (C) of B",
			vec!["A".to_string(), "B".to_string()],
		);

		// Act
		let message = error.to_string();

		// Assert
		assert_eq!(
			message,
			"unresolvable dependency $c (C) of B while building [A, B]"
		);
	}

	#[rstest]
	fn test_container_error_without_trail() {
		// Arrange
		let error = DiError::container("target [Shape] is not instantiable", Vec::new());

		// Act & Assert
		assert_eq!(error.to_string(), "target [Shape] is not instantiable");
		assert!(error.trail().is_empty());
	}

	#[rstest]
	fn test_user_errors_are_not_container_exceptions() {
		// Arrange
		let user = DiError::from(anyhow::anyhow!("disk full"));
		let not_found = DiError::NotFound("Logger".to_string());

		// Assert
		assert!(!user.is_container_exception());
		assert!(not_found.is_container_exception());
		assert!(not_found.is_not_found());
	}
}
