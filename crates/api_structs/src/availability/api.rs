use crate::shared::SuccessResponse;
use consultation_booking_domain::ID;
use serde::{Deserialize, Serialize};

pub mod check_availability {
    use super::*;

    /// `date` is `YYYY-MM-DD` and `time` is `HH:MM`, both in the region timezone
    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub expert_id: ID,
        pub date: String,
        pub time: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailabilityDTO {
        pub expert_id: ID,
        pub date: String,
        pub time: String,
        pub available: bool,
    }

    pub type APIResponse = SuccessResponse<AvailabilityDTO>;
}
