use super::IOffTimeRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use consultation_booking_domain::{OffTime, ID};

pub struct InMemoryOffTimeRepo {
    off_times: std::sync::Mutex<Vec<OffTime>>,
}

impl InMemoryOffTimeRepo {
    pub fn new() -> Self {
        Self {
            off_times: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IOffTimeRepo for InMemoryOffTimeRepo {
    async fn insert(&self, off_time: &OffTime) -> anyhow::Result<()> {
        insert(off_time, &self.off_times);
        Ok(())
    }

    async fn find(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>> {
        Ok(find(off_time_id, &self.off_times))
    }

    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<OffTime>> {
        let mut off_times = find_by(&self.off_times, |o| o.expert_id == *expert_id);
        off_times.sort_by_key(|o| o.start_date);
        Ok(off_times)
    }

    async fn find_covering_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
    ) -> anyhow::Result<Vec<OffTime>> {
        Ok(find_by(&self.off_times, |o| {
            o.expert_id == *expert_id && o.covers(date)
        }))
    }

    async fn delete(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>> {
        Ok(delete(off_time_id, &self.off_times))
    }
}
