use chrono::{DateTime, Utc};
use consultation_booking_domain::{MinuteOfDay, Schedule, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleDTO {
    pub id: ID,
    pub expert_id: ID,
    pub day_of_week: u8,
    /// `HH:MM`
    pub start_time: MinuteOfDay,
    pub end_time: MinuteOfDay,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleDTO {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            id: schedule.id,
            expert_id: schedule.expert_id,
            day_of_week: schedule.day_of_week,
            start_time: schedule.start,
            end_time: schedule.end,
            is_active: schedule.is_active,
            created_at: schedule.created,
            updated_at: schedule.updated,
        }
    }
}
