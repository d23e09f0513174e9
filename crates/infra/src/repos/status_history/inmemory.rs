use super::IStatusHistoryRepo;
use crate::repos::shared::inmemory_repo::*;
use consultation_booking_domain::{StatusHistory, ID};

pub struct InMemoryStatusHistoryRepo {
    histories: std::sync::Mutex<Vec<StatusHistory>>,
}

impl InMemoryStatusHistoryRepo {
    pub fn new() -> Self {
        Self {
            histories: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Used by the inmemory booking repo to append within its own critical section
    pub(crate) fn append(&self, history: &StatusHistory) {
        insert(history, &self.histories);
    }
}

#[async_trait::async_trait]
impl IStatusHistoryRepo for InMemoryStatusHistoryRepo {
    async fn insert(&self, history: &StatusHistory) -> anyhow::Result<()> {
        self.append(history);
        Ok(())
    }

    async fn find_by_booking(&self, booking_id: &ID) -> anyhow::Result<Vec<StatusHistory>> {
        let mut histories = find_by(&self.histories, |h| h.booking_id == *booking_id);
        // Stable, so entries written in the same millisecond keep insertion order
        histories.sort_by_key(|h| h.created);
        Ok(histories)
    }
}
