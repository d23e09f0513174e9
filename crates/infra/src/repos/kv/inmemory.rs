use super::IKVRepo;
use crate::system::ISys;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryKVRepo {
    entries: Mutex<HashMap<String, Entry>>,
    sys: Arc<dyn ISys>,
}

impl InMemoryKVRepo {
    pub fn new(sys: Arc<dyn ISys>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sys,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        self.sys.now() + ttl
    }
}

#[async_trait::async_trait]
impl IKVRepo for InMemoryKVRepo {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let now = self.sys.now();
        Ok(self
            .entries()
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: self.expires_at(ttl),
        };
        self.entries().insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<bool> {
        let now = self.sys.now();
        let expires_at = self.expires_at(ttl);
        let mut entries = self.entries();
        if let Some(existing) = entries.get(key) {
            if existing.expires_at > now {
                return Ok(false);
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn delete_if_value(&self, key: &str, value: &str) -> anyhow::Result<bool> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.value == value => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_prefix(&self, prefix: &str) -> anyhow::Result<u64> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let now = self.sys.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
