use crate::{
    error::BookingError,
    shared::{
        deadline::bounded,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use consultation_booking_api_structs::get_expert_off_times::*;
use consultation_booking_domain::{OffTime, ID};
use consultation_booking_infra::BookingContext;

pub async fn get_expert_off_times_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let usecase = GetExpertOffTimesUseCase {
        expert_id: path.expert_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|off_times| HttpResponse::Ok().json(APIResponse::from_off_times(off_times)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct GetExpertOffTimesUseCase {
    pub expert_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    ExpertNotFound(ID),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpertOffTimesUseCase {
    type Response = Vec<OffTime>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetExpertOffTimes";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if expert.is_none() {
            return Err(UseCaseError::ExpertNotFound(self.expert_id.clone()));
        }

        let mut off_times = bounded(ctx, ctx.repos.off_times.find_by_expert(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        off_times.sort_by_key(|o| o.start_date);
        Ok(off_times)
    }
}
