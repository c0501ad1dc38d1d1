//! Store double for job tests: wraps the in-memory store and injects failures.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use boardkeep_core::RecordId;
use serde_json::Value;

use crate::store::{Criteria, EntityStore, InMemoryEntityStore, Record, Sort, StoreError};

#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: InMemoryEntityStore,
    failing_updates: HashSet<String>,
    failing_filters: Vec<(String, Value)>,
    rate_limited_calls: AtomicU32,
    filter_delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub update_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates of record `id` fail with a 500.
    pub fn fail_update(mut self, id: &str) -> Self {
        self.failing_updates.insert(id.to_string());
        self
    }

    /// Filters whose criteria contain `field == value` fail with a 500.
    pub fn fail_filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.failing_filters.push((field.to_string(), value.into()));
        self
    }

    /// The next `n` calls of any kind answer 429.
    pub fn rate_limit_first(self, n: u32) -> Self {
        self.rate_limited_calls.store(n, Ordering::SeqCst);
        self
    }

    pub fn slow_filters(mut self, delay: Duration) -> Self {
        self.filter_delay = Some(delay);
        self
    }

    pub fn updates(&self) -> u32 {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn throttle(&self) -> Result<(), StoreError> {
        let limited = self
            .rate_limited_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if limited {
            return Err(StoreError::Remote {
                status: 429,
                message: "Too Many Requests".into(),
            });
        }
        Ok(())
    }
}

fn server_error() -> StoreError {
    StoreError::Remote {
        status: 500,
        message: "internal error".into(),
    }
}

#[async_trait::async_trait]
impl EntityStore for FlakyStore {
    async fn filter(
        &self,
        entity: &str,
        criteria: &Criteria,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        self.throttle()?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.filter_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failing = self
            .failing_filters
            .iter()
            .any(|(field, value)| criteria.get(field) == Some(value));
        if failing {
            return Err(server_error());
        }
        self.inner.filter(entity, criteria, sort, limit).await
    }

    async fn list(&self, entity: &str, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<Record>, StoreError> {
        self.throttle()?;
        self.inner.list(entity, sort, limit).await
    }

    async fn update(&self, entity: &str, id: &RecordId, fields: Record) -> Result<Record, StoreError> {
        self.throttle()?;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_updates.contains(id.as_str()) {
            return Err(server_error());
        }
        self.inner.update(entity, id, fields).await
    }

    async fn delete(&self, entity: &str, id: &RecordId) -> Result<(), StoreError> {
        self.throttle()?;
        self.inner.delete(entity, id).await
    }
}
