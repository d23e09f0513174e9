use chrono::{DateTime, NaiveDate, Utc};
use consultation_booking_domain::{OffTime, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OffTimeDTO {
    pub id: ID,
    pub expert_id: ID,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OffTimeDTO {
    pub fn new(off_time: OffTime) -> Self {
        Self {
            id: off_time.id,
            expert_id: off_time.expert_id,
            start_date: off_time.start_date,
            end_date: off_time.end_date,
            reason: off_time.reason,
            created_at: off_time.created,
        }
    }
}
