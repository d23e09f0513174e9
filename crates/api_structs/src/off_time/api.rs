use crate::{dtos::OffTimeDTO, shared::SuccessResponse};
use consultation_booking_domain::{OffTime, ID};
use serde::{Deserialize, Serialize};

pub type OffTimeResponse = SuccessResponse<OffTimeDTO>;

impl OffTimeResponse {
    pub fn from_off_time(off_time: OffTime) -> Self {
        Self::new(OffTimeDTO::new(off_time))
    }
}

pub mod create_off_time {
    use super::*;

    /// Dates are `YYYY-MM-DD`, both inclusive
    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub expert_id: ID,
        pub start_date: String,
        pub end_date: String,
        pub reason: Option<String>,
    }

    pub type APIResponse = OffTimeResponse;
}

pub mod get_expert_off_times {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type APIResponse = SuccessResponse<Vec<OffTimeDTO>>;

    impl APIResponse {
        pub fn from_off_times(off_times: Vec<OffTime>) -> Self {
            Self::new(off_times.into_iter().map(OffTimeDTO::new).collect())
        }
    }
}

pub mod delete_off_time {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub off_time_id: ID,
    }

    pub type APIResponse = OffTimeResponse;
}
