use crate::{dtos::ExpertDTO, shared::SuccessResponse};
use consultation_booking_domain::{Expert, ExpertStatus, ID};
use serde::{Deserialize, Serialize};

pub type ExpertResponse = SuccessResponse<ExpertDTO>;

impl ExpertResponse {
    pub fn from_expert(expert: Expert) -> Self {
        Self::new(ExpertDTO::new(expert))
    }
}

pub type ExpertsResponse = SuccessResponse<Vec<ExpertDTO>>;

impl ExpertsResponse {
    pub fn from_experts(experts: Vec<Expert>) -> Self {
        Self::new(experts.into_iter().map(ExpertDTO::new).collect())
    }
}

pub mod create_expert {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct RequestBody {
        pub name: String,
        pub email: String,
        pub expertise: String,
    }

    pub type APIResponse = ExpertResponse;
}

pub mod get_expert {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type APIResponse = ExpertResponse;
}

pub mod get_experts {
    use super::*;

    #[derive(Deserialize, Serialize, Default)]
    pub struct QueryParams {
        pub page: Option<usize>,
        pub limit: Option<usize>,
        /// Looks up the single expert with this email instead of paging
        pub email: Option<String>,
    }

    pub type APIResponse = ExpertsResponse;
}

pub mod get_experts_by_expertise {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expertise: String,
    }

    pub type APIResponse = ExpertsResponse;
}

pub mod update_expert {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    #[derive(Serialize, Deserialize, Default)]
    pub struct RequestBody {
        pub name: Option<String>,
        pub email: Option<String>,
        pub expertise: Option<String>,
        pub status: Option<ExpertStatus>,
    }

    pub type APIResponse = ExpertResponse;
}

pub mod delete_expert {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub expert_id: ID,
    }

    pub type APIResponse = ExpertResponse;
}
