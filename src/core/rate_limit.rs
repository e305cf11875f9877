use crate::domain::model::UsageCounter;
use crate::domain::ports::CounterStore;
use crate::utils::error::Result;
use chrono::{DateTime, Duration, Utc};

/// Ceiling per identifier per day. Resets only through the store's expiry
/// policy, not here.
pub const DAILY_LIMIT: u32 = 30;

/// Ceiling per trailing 60-minute window, anchored at the last request.
pub const HOURLY_LIMIT: u32 = 10;

/// Sentinel identifier shared by all unauthenticated demo traffic.
pub const DEMO_USAGE_ID: &str = "demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDecision {
    Allowed,
    Denied,
}

impl UsageDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, UsageDecision::Allowed)
    }
}

/// Gate for the unauthenticated demo path. The only cross-request shared
/// state in the pipeline; admission is serialized per identifier through the
/// store's conditional increment.
pub struct UsageLimiter<C> {
    store: C,
}

impl<C: CounterStore> UsageLimiter<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    fn decide(counter: &UsageCounter, now: DateTime<Utc>) -> UsageDecision {
        if counter.daily_count >= DAILY_LIMIT {
            return UsageDecision::Denied;
        }

        let window_start = now - Duration::minutes(60);
        if counter.hourly_count >= HOURLY_LIMIT && counter.last_request_time > window_start {
            return UsageDecision::Denied;
        }

        UsageDecision::Allowed
    }

    /// Read-only decision for `id`. Does not consume quota.
    pub async fn check(&self, id: &str) -> Result<bool> {
        let counter = self.store.get(id).await?;
        Ok(Self::decide(&counter, Utc::now()).is_allowed())
    }

    /// Atomic allow-and-record: the decision and the increment are one
    /// logical operation, so two concurrent requests sitting one below a
    /// limit can never both be admitted. Runs an optimistic-retry loop over
    /// the store's conditional increment.
    pub async fn check_and_record(&self, id: &str) -> Result<UsageDecision> {
        // Every lost race means a competing request was admitted, so after a
        // handful of collisions denying is the conservative outcome.
        for attempt in 0..8 {
            let snapshot = self.store.get(id).await?;
            let now = Utc::now();

            if Self::decide(&snapshot, now) == UsageDecision::Denied {
                return Ok(UsageDecision::Denied);
            }

            if self.store.increment_if_matches(id, &snapshot, now).await? {
                return Ok(UsageDecision::Allowed);
            }

            tracing::debug!("Counter write conflict for '{}' (attempt {})", id, attempt);
        }

        tracing::warn!("Giving up on contended counter for '{}'; denying", id);
        Ok(UsageDecision::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryCounterStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Store double serving a crafted counter, always accepting increments.
    struct FixedStore {
        counter: UsageCounter,
    }

    #[async_trait]
    impl CounterStore for FixedStore {
        async fn get(&self, _id: &str) -> Result<UsageCounter> {
            Ok(self.counter.clone())
        }

        async fn increment_if_matches(
            &self,
            _id: &str,
            _expected: &UsageCounter,
            _now: DateTime<Utc>,
        ) -> Result<bool> {
            Ok(true)
        }
    }

    fn counter(daily: u32, hourly: u32, last_minutes_ago: i64) -> UsageCounter {
        UsageCounter {
            daily_count: daily,
            hourly_count: hourly,
            last_request_time: Utc::now() - Duration::minutes(last_minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_fresh_identifier_is_allowed_and_recorded() {
        let limiter = UsageLimiter::new(MemoryCounterStore::new());

        assert!(limiter.check("demo").await.unwrap());
        let decision = limiter.check_and_record("demo").await.unwrap();
        assert_eq!(decision, UsageDecision::Allowed);
    }

    #[tokio::test]
    async fn test_daily_ceiling_denies_the_31st_request() {
        // Last request long outside the hourly window, so only the daily
        // ceiling is in play.
        let at_29 = UsageLimiter::new(FixedStore {
            counter: counter(29, 3, 120),
        });
        assert!(at_29.check("demo").await.unwrap());

        let at_30 = UsageLimiter::new(FixedStore {
            counter: counter(30, 3, 120),
        });
        assert!(!at_30.check("demo").await.unwrap());
        assert_eq!(
            at_30.check_and_record("demo").await.unwrap(),
            UsageDecision::Denied
        );
    }

    #[tokio::test]
    async fn test_hourly_ceiling_denies_within_trailing_window() {
        let limiter = UsageLimiter::new(FixedStore {
            counter: counter(12, HOURLY_LIMIT, 59),
        });
        assert!(!limiter.check("demo").await.unwrap());
    }

    #[tokio::test]
    async fn test_hourly_ceiling_clears_once_window_has_passed() {
        let limiter = UsageLimiter::new(FixedStore {
            counter: counter(12, HOURLY_LIMIT, 61),
        });
        assert!(limiter.check("demo").await.unwrap());
    }

    #[tokio::test]
    async fn test_eleventh_rapid_request_is_denied() {
        let limiter = UsageLimiter::new(MemoryCounterStore::new());

        for _ in 0..HOURLY_LIMIT {
            assert_eq!(
                limiter.check_and_record("demo").await.unwrap(),
                UsageDecision::Allowed
            );
        }

        assert_eq!(
            limiter.check_and_record("demo").await.unwrap(),
            UsageDecision::Denied
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_at_the_boundary_admit_exactly_one() {
        let store = MemoryCounterStore::new();
        let limiter = Arc::new(UsageLimiter::new(store));

        // Sit one below the hourly ceiling.
        for _ in 0..HOURLY_LIMIT - 1 {
            assert_eq!(
                limiter.check_and_record("demo").await.unwrap(),
                UsageDecision::Allowed
            );
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(
                async move { limiter.check_and_record("demo").await },
            ));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_allowed() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 1);
    }
}
