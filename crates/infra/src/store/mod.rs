//! Remote entity store abstractions.
//!
//! The store is an external, rate-limited, eventually consistent service.
//! Everything here is async and every call may fail on its own.

pub mod http;
pub mod in_memory;
pub mod query;

use std::marker::PhantomData;
use std::sync::Arc;

use boardkeep_core::{Entity, RecordId};
use boardkeep_resilience::RemoteFailure;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;

pub use http::HttpEntityStore;
pub use in_memory::InMemoryEntityStore;
pub use query::{Criteria, Sort};

/// A raw record as exchanged with the store.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Entity store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {entity}/{id}")]
    NotFound { entity: String, id: RecordId },
    #[error("entity store returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("entity store unreachable: {0}")]
    Transport(String),
    #[error("malformed record: {0}")]
    Decode(String),
}

impl RemoteFailure for StoreError {
    fn status(&self) -> Option<u16> {
        match self {
            StoreError::NotFound { .. } => Some(404),
            StoreError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Record-oriented store contract.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Records of `entity` matching `criteria`, optionally sorted and limited.
    async fn filter(
        &self,
        entity: &str,
        criteria: &Criteria,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError>;

    /// All records of `entity`, optionally sorted and limited.
    async fn list(&self, entity: &str, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<Record>, StoreError>;

    /// Merge `fields` into record `id` and return the updated record.
    async fn update(&self, entity: &str, id: &RecordId, fields: Record) -> Result<Record, StoreError>;

    async fn delete(&self, entity: &str, id: &RecordId) -> Result<(), StoreError>;
}

/// Build the store described by configuration: remote when a base URL is set,
/// otherwise an empty in-memory store.
pub fn connect(config: &StoreConfig) -> Arc<dyn EntityStore> {
    match &config.base_url {
        Some(url) => {
            info!(base_url = %url, "using remote entity store");
            Arc::new(HttpEntityStore::new(url.clone(), config.api_key.clone()))
        }
        None => {
            warn!("ENTITY_STORE_URL not set; using empty in-memory store");
            Arc::new(InMemoryEntityStore::new())
        }
    }
}

/// Typed view over one collection.
pub struct Collection<'a, T> {
    store: &'a dyn EntityStore,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Collection<'a, T> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn filter(
        &self,
        criteria: &Criteria,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let records = self.store.filter(T::NAME, criteria, sort, limit).await?;
        Ok(decode_all(records))
    }

    pub async fn list(&self, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<T>, StoreError> {
        let records = self.store.list(T::NAME, sort, limit).await?;
        Ok(decode_all(records))
    }
}

/// Decode records, dropping the ones that don't fit `T`.
fn decode_all<T: Entity>(records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<T>(serde_json::Value::Object(record)) {
            Ok(entity) => Some(entity),
            Err(e) => {
                debug!(entity = T::NAME, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Single-field partial update.
pub fn fields(key: &str, value: impl Into<serde_json::Value>) -> Record {
    let mut record = Record::new();
    record.insert(key.to_string(), value.into());
    record
}
