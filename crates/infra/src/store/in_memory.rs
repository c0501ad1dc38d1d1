//! In-memory entity store for tests/dev.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use boardkeep_core::RecordId;
use serde_json::Value;

use super::{Criteria, EntityStore, Record, Sort, StoreError};

/// Collections keyed by entity name; records keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    next_id: AtomicU64,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, assigning an `id` when it has none. Returns the id.
    pub fn insert(&self, entity: &str, mut record: Record) -> RecordId {
        let id = match record.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let id = format!("{}-{n}", entity.to_lowercase());
                record.insert("id".into(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        collections.entry(entity.to_string()).or_default().push(record);
        RecordId::new(id).unwrap_or_else(|_| unreachable!("ids are non-empty"))
    }

    /// Insert a JSON object literal (non-objects are ignored).
    pub fn insert_json(&self, entity: &str, value: Value) -> Option<RecordId> {
        match value {
            Value::Object(record) => Some(self.insert(entity, record)),
            _ => None,
        }
    }

    pub fn get(&self, entity: &str, id: &RecordId) -> Option<Record> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections
            .get(entity)?
            .iter()
            .find(|r| record_id(r) == Some(id.as_str()))
            .cloned()
    }

    pub fn len(&self, entity: &str) -> usize {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections.get(entity).map_or(0, Vec::len)
    }

    fn select(
        &self,
        entity: &str,
        criteria: Option<&Criteria>,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Vec<Record> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let mut result: Vec<Record> = collections
            .get(entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| criteria.map_or(true, |c| c.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            result.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = limit {
            result.truncate(limit);
        }
        result
    }
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait::async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn filter(
        &self,
        entity: &str,
        criteria: &Criteria,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        Ok(self.select(entity, Some(criteria), sort, limit))
    }

    async fn list(&self, entity: &str, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<Record>, StoreError> {
        Ok(self.select(entity, None, sort, limit))
    }

    async fn update(&self, entity: &str, id: &RecordId, fields: Record) -> Result<Record, StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let record = collections
            .get_mut(entity)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == Some(id.as_str())))
            .ok_or_else(|| StoreError::NotFound {
                entity: entity.to_string(),
                id: id.clone(),
            })?;

        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, entity: &str, id: &RecordId) -> Result<(), StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let records = collections.get_mut(entity);
        let position = records
            .as_ref()
            .and_then(|records| records.iter().position(|r| record_id(r) == Some(id.as_str())));

        match (records, position) {
            (Some(records), Some(i)) => {
                records.remove(i);
                Ok(())
            }
            _ => Err(StoreError::NotFound {
                entity: entity.to_string(),
                id: id.clone(),
            }),
        }
    }
}
