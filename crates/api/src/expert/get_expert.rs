use crate::{
    error::BookingError,
    shared::{
        deadline::bounded,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use consultation_booking_api_structs::get_expert::*;
use consultation_booking_domain::{Expert, ID};
use consultation_booking_infra::BookingContext;

pub async fn get_expert_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let usecase = GetExpertUseCase {
        expert_id: path.expert_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|expert| HttpResponse::Ok().json(APIResponse::from_expert(expert)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct GetExpertUseCase {
    pub expert_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpertUseCase {
    type Response = Expert;

    type Error = UseCaseError;

    const NAME: &'static str = "GetExpert";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.expert_id.clone()))
    }
}
