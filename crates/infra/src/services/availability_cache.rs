use crate::repos::IKVRepo;
use chrono::NaiveDate;
use consultation_booking_domain::{date::format_date, ID};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::warn;

const KEY_PREFIX: &str = "availability";

/// Memoizes availability answers per expert and local date.
///
/// The cache is a hint. Read and write failures are logged and treated as
/// a miss, so callers never fail because of it.
#[derive(Clone)]
pub struct AvailabilityCache {
    kv: Arc<dyn IKVRepo>,
    ttl: Duration,
    timeout: Duration,
}

impl AvailabilityCache {
    pub fn new(kv: Arc<dyn IKVRepo>, ttl: Duration, timeout: Duration) -> Self {
        Self { kv, ttl, timeout }
    }

    pub fn key(expert_id: &ID, date: &NaiveDate) -> String {
        format!("{}:{}:{}", KEY_PREFIX, expert_id, format_date(date))
    }

    fn expert_prefix(expert_id: &ID) -> String {
        format!("{}:{}:", KEY_PREFIX, expert_id)
    }

    pub async fn get(&self, expert_id: &ID, date: &NaiveDate) -> Option<bool> {
        let key = Self::key(expert_id, date);
        match timeout(self.timeout, self.kv.get(&key)).await {
            Ok(Ok(Some(value))) => match value.as_str() {
                "1" => Some(true),
                "0" => Some(false),
                _ => {
                    warn!("Ignoring unexpected availability cache value {} for {}", value, key);
                    None
                }
            },
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("Availability cache read failed for {}: {:?}", key, e);
                None
            }
            Err(_) => {
                warn!("Availability cache read timed out for {}", key);
                None
            }
        }
    }

    pub async fn set(&self, expert_id: &ID, date: &NaiveDate, available: bool) {
        let key = Self::key(expert_id, date);
        let value = if available { "1" } else { "0" };
        match timeout(self.timeout, self.kv.set(&key, value, self.ttl)).await {
            Ok(Ok(())) => (),
            Ok(Err(e)) => warn!("Availability cache write failed for {}: {:?}", key, e),
            Err(_) => warn!("Availability cache write timed out for {}", key),
        }
    }

    /// Drops every memoized answer for the expert
    pub async fn invalidate_expert(&self, expert_id: &ID) {
        let prefix = Self::expert_prefix(expert_id);
        match timeout(self.timeout, self.kv.delete_by_prefix(&prefix)).await {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => warn!("Availability cache invalidation failed for {}: {:?}", prefix, e),
            Err(_) => warn!("Availability cache invalidation timed out for {}", prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repos::FailingKVRepo, BookingContext};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn builds_keys() {
        let expert_id: ID = "7b3c4a0e-6f51-4a8e-9d3a-0c1b2d3e4f5a".parse().unwrap();
        assert_eq!(
            AvailabilityCache::key(&expert_id, &date(2)),
            "availability:7b3c4a0e-6f51-4a8e-9d3a-0c1b2d3e4f5a:2025-06-02"
        );
    }

    #[tokio::test]
    async fn memoizes_and_invalidates_per_expert() {
        let ctx = BookingContext::create_inmemory();
        let cache = &ctx.cache;
        let expert_id = ID::new();
        let other_expert = ID::new();

        assert_eq!(cache.get(&expert_id, &date(2)).await, None);
        cache.set(&expert_id, &date(2), true).await;
        cache.set(&expert_id, &date(3), false).await;
        cache.set(&other_expert, &date(2), true).await;
        assert_eq!(cache.get(&expert_id, &date(2)).await, Some(true));
        assert_eq!(cache.get(&expert_id, &date(3)).await, Some(false));

        cache.invalidate_expert(&expert_id).await;
        assert_eq!(cache.get(&expert_id, &date(2)).await, None);
        assert_eq!(cache.get(&expert_id, &date(3)).await, None);
        assert_eq!(cache.get(&other_expert, &date(2)).await, Some(true));
    }

    #[tokio::test]
    async fn failures_behave_like_misses() {
        let cache = AvailabilityCache::new(
            Arc::new(FailingKVRepo),
            Duration::from_secs(60),
            Duration::from_millis(100),
        );
        let expert_id = ID::new();
        cache.set(&expert_id, &date(2), true).await;
        assert_eq!(cache.get(&expert_id, &date(2)).await, None);
        cache.invalidate_expert(&expert_id).await;
    }
}
