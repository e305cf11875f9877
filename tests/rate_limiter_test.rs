use receipt_etl::core::rate_limit::{HOURLY_LIMIT, UsageDecision, UsageLimiter};
use receipt_etl::{MemoryCounterStore, DEMO_USAGE_ID};
use std::sync::Arc;

#[tokio::test]
async fn test_check_alone_never_consumes_quota() {
    let limiter = UsageLimiter::new(MemoryCounterStore::new());

    for _ in 0..100 {
        assert!(limiter.check(DEMO_USAGE_ID).await.unwrap());
    }

    // Quota is still fully available afterwards.
    assert_eq!(
        limiter.check_and_record(DEMO_USAGE_ID).await.unwrap(),
        UsageDecision::Allowed
    );
}

#[tokio::test]
async fn test_rapid_burst_is_cut_off_at_the_hourly_ceiling() {
    let limiter = UsageLimiter::new(MemoryCounterStore::new());

    for i in 0..HOURLY_LIMIT {
        assert_eq!(
            limiter.check_and_record(DEMO_USAGE_ID).await.unwrap(),
            UsageDecision::Allowed,
            "request {} should have been admitted",
            i + 1
        );
    }

    assert_eq!(
        limiter.check_and_record(DEMO_USAGE_ID).await.unwrap(),
        UsageDecision::Denied
    );
    assert!(!limiter.check(DEMO_USAGE_ID).await.unwrap());
}

#[tokio::test]
async fn test_identifiers_are_limited_independently() {
    let limiter = Arc::new(UsageLimiter::new(MemoryCounterStore::new()));

    for _ in 0..HOURLY_LIMIT {
        limiter.check_and_record("demo").await.unwrap();
    }

    assert_eq!(
        limiter.check_and_record("demo").await.unwrap(),
        UsageDecision::Denied
    );
    // A different identifier is untouched by demo's burst.
    assert_eq!(
        limiter.check_and_record("another-user").await.unwrap(),
        UsageDecision::Allowed
    );
}

#[tokio::test]
async fn test_concurrent_burst_from_fresh_admits_exactly_the_hourly_quota() {
    let limiter = Arc::new(UsageLimiter::new(MemoryCounterStore::new()));

    let mut handles = Vec::new();
    for _ in 0..(HOURLY_LIMIT as usize * 3) {
        let limiter = Arc::clone(&limiter);
        handles.push(tokio::spawn(async move {
            limiter.check_and_record(DEMO_USAGE_ID).await
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_allowed() {
            allowed += 1;
        }
    }

    // Optimistic retries may deny a few contended winners early, but
    // over-admission is never acceptable.
    assert!(allowed <= HOURLY_LIMIT, "over-admitted: {}", allowed);
    assert!(allowed >= 1);
}
