mod inmemory;
mod postgres;

pub use inmemory::InMemoryKVRepo;
pub use postgres::PostgresKVRepo;
use std::time::Duration;

/// String key-value store with per entry expiry. Expired entries behave
/// as if they were absent.
#[async_trait::async_trait]
pub trait IKVRepo: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;
    /// Only sets the value if the key is absent. Returns whether it was set.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<bool>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    /// Deletes the key only while it still holds `value`
    async fn delete_if_value(&self, key: &str, value: &str) -> anyhow::Result<bool>;
    async fn delete_by_prefix(&self, prefix: &str) -> anyhow::Result<u64>;
    async fn purge_expired(&self) -> anyhow::Result<u64>;
}

/// Store that is always down
#[cfg(test)]
pub(crate) struct FailingKVRepo;

#[cfg(test)]
#[async_trait::async_trait]
impl IKVRepo for FailingKVRepo {
    async fn get(&self, _: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn set(&self, _: &str, _: &str, _: Duration) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn set_nx(&self, _: &str, _: &str, _: Duration) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete_if_value(&self, _: &str, _: &str) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete_by_prefix(&self, _: &str) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn purge_expired(&self) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused"))
    }
}
