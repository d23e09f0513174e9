use chrono::{DateTime, Utc};
use consultation_booking_domain::{Expert, ExpertStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExpertDTO {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub expertise: String,
    pub status: ExpertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpertDTO {
    pub fn new(expert: Expert) -> Self {
        Self {
            id: expert.id,
            name: expert.name,
            email: expert.email,
            expertise: expert.expertise,
            status: expert.status,
            created_at: expert.created,
            updated_at: expert.updated,
        }
    }
}
