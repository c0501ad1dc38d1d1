//! Entity trait: a record type living in a named entity-store collection.

use serde::de::DeserializeOwned;

/// A typed record stored in the remote entity store.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Collection name on the remote platform.
    const NAME: &'static str;
}
