//! Storage primitives backing every container pool.
//!
//! - [`KeyStore`]: one value per key (bindings, resolved entries)
//! - [`CollectionStack`]: an ordered collection per key (tags, alias index)
//! - [`Stack`] / [`StackFrame`]: LIFO frames with guaranteed release

mod collection;
mod key_store;
mod stack;

pub use collection::CollectionStack;
pub use key_store::KeyStore;
pub use stack::{Stack, StackFrame};
