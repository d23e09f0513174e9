use super::IScheduleRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use consultation_booking_domain::{Schedule, ID};

pub struct InMemoryScheduleRepo {
    schedules: std::sync::Mutex<Vec<Schedule>>,
}

impl InMemoryScheduleRepo {
    pub fn new() -> Self {
        Self {
            schedules: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for InMemoryScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        insert(schedule, &self.schedules);
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        save(schedule, &self.schedules);
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>> {
        Ok(find(schedule_id, &self.schedules))
    }

    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<Schedule>> {
        Ok(find_by(&self.schedules, |s| s.expert_id == *expert_id))
    }

    async fn find_active_by_expert_and_day(
        &self,
        expert_id: &ID,
        day_of_week: u8,
    ) -> anyhow::Result<Vec<Schedule>> {
        Ok(find_by(&self.schedules, |s| {
            s.expert_id == *expert_id && s.day_of_week == day_of_week && s.is_active
        }))
    }

    async fn deactivate(
        &self,
        schedule_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Schedule>> {
        update_many(
            &self.schedules,
            |s| s.id == *schedule_id,
            |s| s.deactivate(now),
        );
        Ok(find(schedule_id, &self.schedules))
    }
}
