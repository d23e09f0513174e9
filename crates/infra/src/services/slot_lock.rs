use crate::repos::IKVRepo;
use consultation_booking_domain::{TimeSpan, ID};
use consultation_booking_utils::create_random_token;
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::warn;

const KEY_PREFIX: &str = "booking_lock";

/// Short lived mutual exclusion over an (expert, time range) pair that
/// serializes concurrent admissions for the exact same slot.
#[derive(Clone)]
pub struct SlotLock {
    kv: Arc<dyn IKVRepo>,
    ttl: Duration,
    timeout: Duration,
}

/// Proof of ownership for an acquired lock. Only the holder of the token
/// can release it.
#[derive(Debug)]
pub struct SlotLockGuard {
    key: String,
    token: String,
}

impl SlotLockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug)]
pub enum LockOutcome {
    Acquired(SlotLockGuard),
    /// Someone else is admitting the same slot right now
    Busy,
    /// The lock store could not be reached
    Unavailable,
}

impl SlotLock {
    pub fn new(kv: Arc<dyn IKVRepo>, ttl: Duration, timeout: Duration) -> Self {
        Self { kv, ttl, timeout }
    }

    pub fn key(expert_id: &ID, span: &TimeSpan) -> String {
        format!(
            "{}:{}:{}:{}",
            KEY_PREFIX,
            expert_id,
            span.start().to_rfc3339(),
            span.end().to_rfc3339()
        )
    }

    pub async fn acquire(&self, expert_id: &ID, span: &TimeSpan) -> LockOutcome {
        let key = Self::key(expert_id, span);
        let token = create_random_token(32);
        match timeout(self.timeout, self.kv.set_nx(&key, &token, self.ttl)).await {
            Ok(Ok(true)) => LockOutcome::Acquired(SlotLockGuard { key, token }),
            Ok(Ok(false)) => LockOutcome::Busy,
            Ok(Err(e)) => {
                warn!("Unable to acquire admission lock {}: {:?}", key, e);
                LockOutcome::Unavailable
            }
            Err(_) => {
                warn!("Acquiring admission lock {} timed out", key);
                LockOutcome::Unavailable
            }
        }
    }

    /// Releases the lock unless it has expired and been taken over by
    /// someone else in the meantime
    pub async fn release(&self, guard: SlotLockGuard) {
        match timeout(
            self.timeout,
            self.kv.delete_if_value(&guard.key, &guard.token),
        )
        .await
        {
            Ok(Ok(true)) => (),
            Ok(Ok(false)) => warn!(
                "Admission lock {} was no longer held at release",
                guard.key
            ),
            Ok(Err(e)) => warn!("Unable to release admission lock {}: {:?}", guard.key, e),
            Err(_) => warn!("Releasing admission lock {} timed out", guard.key),
        }
    }
}
