use crate::domain::model::UsageCounter;
use crate::domain::ports::CounterStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory counter store. Counters live for the process lifetime; expiry
/// (the daily reset) is the concern of a real external store.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    counters: Arc<Mutex<HashMap<String, UsageCounter>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, id: &str) -> Result<UsageCounter> {
        let counters = self.counters.lock().await;
        Ok(counters.get(id).cloned().unwrap_or_default())
    }

    async fn increment_if_matches(
        &self,
        id: &str,
        expected: &UsageCounter,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut counters = self.counters.lock().await;
        let current = counters.get(id).cloned().unwrap_or_default();

        if current != *expected {
            return Ok(false);
        }

        counters.insert(
            id.to_string(),
            UsageCounter {
                daily_count: current.daily_count + 1,
                hourly_count: current.hourly_count + 1,
                last_request_time: now,
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_defaults_for_unknown_id() {
        let store = MemoryCounterStore::new();
        let counter = store.get("fresh").await.unwrap();
        assert_eq!(counter, UsageCounter::default());
    }

    #[tokio::test]
    async fn test_increment_applies_only_against_matching_snapshot() {
        let store = MemoryCounterStore::new();
        let now = Utc::now();

        let snapshot = store.get("demo").await.unwrap();
        assert!(store
            .increment_if_matches("demo", &snapshot, now)
            .await
            .unwrap());

        // The old snapshot is stale now; a second conditional write loses.
        assert!(!store
            .increment_if_matches("demo", &snapshot, now)
            .await
            .unwrap());

        let counter = store.get("demo").await.unwrap();
        assert_eq!(counter.daily_count, 1);
        assert_eq!(counter.hourly_count, 1);
        assert_eq!(counter.last_request_time, now);
    }
}
