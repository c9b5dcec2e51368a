//! Bidirectional alias mapping

use crate::error::{DiError, DiResult};
use crate::pool::{CollectionStack, KeyStore};
use std::collections::HashSet;

/// Alias to entry map, plus the reverse entry to aliases index.
#[derive(Debug, Default)]
pub struct Aliases {
	aliases: KeyStore<String>,
	abstract_aliases: CollectionStack<String>,
}

impl Aliases {
	pub fn new() -> Self {
		Self::default()
	}

	/// Maps `alias` to `entry`.
	///
	/// Re-aliasing moves the alias to the new entry. Self aliases and alias
	/// chains that loop back are rejected.
	pub fn add(&mut self, entry: &str, alias: &str) -> DiResult<()> {
		if entry == alias {
			return Err(DiError::logical(format!("[{entry}] is aliased to itself")));
		}
		if self.canonical(entry) == alias {
			return Err(DiError::logical(format!(
				"aliasing [{entry}] as [{alias}] would create a circular alias"
			)));
		}
		self.remove_alias(alias);
		self.aliases.set(alias, entry.to_string());
		self.abstract_aliases.push_unique(entry, alias.to_string());
		Ok(())
	}

	/// Follows alias chains down to the entry.
	pub fn canonical(&self, id: &str) -> String {
		let mut current = id;
		let mut visited = HashSet::new();
		while let Some(next) = self.aliases.get(current) {
			if !visited.insert(current) {
				break;
			}
			current = next;
		}
		current.to_string()
	}

	pub fn is_alias(&self, id: &str) -> bool {
		self.aliases.has(id)
	}

	/// Direct aliases of `entry`.
	pub fn aliases_of(&self, entry: &str) -> Vec<String> {
		self.abstract_aliases.get(entry).to_vec()
	}

	/// Removes `alias` from both directions; returns the entry it pointed to.
	pub fn remove_alias(&mut self, alias: &str) -> Option<String> {
		let entry = self.aliases.remove(alias)?;
		self.abstract_aliases.remove_item(&entry, &alias.to_string());
		Some(entry)
	}

	pub fn len(&self) -> usize {
		self.aliases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.aliases.is_empty()
	}

	pub fn reset(&mut self) {
		self.aliases.reset();
		self.abstract_aliases.reset();
	}
}
