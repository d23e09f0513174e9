use crate::{
    dtos::{BookingDTO, BookingStatsDTO, StatusHistoryDTO},
    shared::{PagedResponse, SuccessResponse},
};
use chrono::{DateTime, Utc};
use consultation_booking_domain::{BookingMode, BookingStatus, ID};
use serde::{Deserialize, Serialize};

pub type BookingResponse = SuccessResponse<BookingDTO>;

pub type BookingsResponse = SuccessResponse<Vec<BookingDTO>>;

pub type BookingPageResponse = SuccessResponse<PagedResponse<BookingDTO>>;

/// Filters shared by the booking listings
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct BookingFilterParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<BookingStatus>,
    #[serde(rename = "type")]
    pub mode: Option<BookingMode>,
    /// `YYYY-MM-DD`, inclusive
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub end_date: Option<String>,
}

pub mod create_booking {
    use super::*;

    /// `end_time` may be left out when `duration_minutes` is given
    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub expert_id: ID,
        pub start_time: DateTime<Utc>,
        pub end_time: Option<DateTime<Utc>>,
        pub duration_minutes: Option<i64>,
        #[serde(rename = "type")]
        pub mode: BookingMode,
        pub notes: Option<String>,
        pub location: Option<String>,
        pub meeting_link: Option<String>,
    }

    pub type APIResponse = BookingResponse;
}

pub mod get_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod update_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    #[derive(Debug, Serialize, Deserialize, Default)]
    pub struct RequestBody {
        pub start_time: Option<DateTime<Utc>>,
        pub end_time: Option<DateTime<Utc>>,
        pub duration_minutes: Option<i64>,
        #[serde(rename = "type")]
        pub mode: Option<BookingMode>,
        pub location: Option<String>,
        pub meeting_link: Option<String>,
        pub notes: Option<String>,
    }

    pub type APIResponse = BookingResponse;
}

pub mod update_booking_status {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    /// `status` is validated by the handler so misspellings give a
    /// descriptive error
    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub status: String,
        pub note: Option<String>,
        pub reason: Option<String>,
        pub meeting_link: Option<String>,
    }

    pub type APIResponse = BookingResponse;
}

pub mod cancel_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod get_booking_history {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = SuccessResponse<Vec<StatusHistoryDTO>>;
}

pub mod get_user_bookings {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    pub type QueryParams = BookingFilterParams;

    pub type APIResponse = BookingPageResponse;
}

pub mod get_expert_bookings {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type QueryParams = BookingFilterParams;

    pub type APIResponse = BookingPageResponse;
}

pub mod get_expert_bookings_on_date {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
        /// `YYYY-MM-DD` in the region timezone
        pub date: String,
    }

    pub type APIResponse = BookingsResponse;
}

pub mod get_expert_booking_stats {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type APIResponse = SuccessResponse<BookingStatsDTO>;
}

pub mod check_booking_conflicts {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub expert_id: ID,
        pub start_time: DateTime<Utc>,
        pub end_time: DateTime<Utc>,
        pub exclude_id: Option<ID>,
        pub user_id: Option<ID>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConflictsDTO {
        pub has_conflict: bool,
        pub expert_conflict: bool,
        pub user_conflict: bool,
        /// Only listed for the expert themselves and admins
        pub conflicts: Vec<BookingDTO>,
    }

    pub type APIResponse = SuccessResponse<ConflictsDTO>;
}
