use crate::shared::SuccessResponse;
use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct HealthDTO {
        pub message: String,
    }

    pub type APIResponse = SuccessResponse<HealthDTO>;
}
