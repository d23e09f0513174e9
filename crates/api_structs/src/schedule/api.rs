use crate::{dtos::ScheduleDTO, shared::SuccessResponse};
use consultation_booking_domain::{Schedule, ID};
use serde::{Deserialize, Serialize};

pub type ScheduleResponse = SuccessResponse<ScheduleDTO>;

impl ScheduleResponse {
    pub fn from_schedule(schedule: Schedule) -> Self {
        Self::new(ScheduleDTO::new(schedule))
    }
}

pub type SchedulesResponse = SuccessResponse<Vec<ScheduleDTO>>;

impl SchedulesResponse {
    pub fn from_schedules(schedules: Vec<Schedule>) -> Self {
        Self::new(schedules.into_iter().map(ScheduleDTO::new).collect())
    }
}

pub mod create_schedule {
    use super::*;

    /// Either `day_of_week` or `days_of_week` has to be given. One schedule
    /// is created per day.
    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub expert_id: ID,
        pub day_of_week: Option<i64>,
        pub days_of_week: Option<Vec<i64>>,
        pub start_time: String,
        pub end_time: String,
    }

    pub type APIResponse = SchedulesResponse;
}

pub mod get_expert_schedules {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type APIResponse = SchedulesResponse;
}

pub mod update_schedule {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub schedule_id: ID,
    }

    #[derive(Serialize, Deserialize, Default)]
    pub struct RequestBody {
        pub day_of_week: Option<i64>,
        pub start_time: Option<String>,
        pub end_time: Option<String>,
    }

    pub type APIResponse = ScheduleResponse;
}

pub mod delete_schedule {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub schedule_id: ID,
    }

    pub type APIResponse = ScheduleResponse;
}
