use super::resolver::{is_available, ResolverError};
use crate::{
    error::BookingError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use consultation_booking_api_structs::check_availability::*;
use consultation_booking_domain::{
    date::{format_date, local_to_utc, parse_date},
    MinuteOfDay, ID,
};
use consultation_booking_infra::BookingContext;

pub async fn check_availability_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let body = body.0;
    let usecase = CheckAvailabilityUseCase {
        expert_id: body.expert_id,
        date: body.date,
        time: body.time,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct CheckAvailabilityUseCase {
    pub expert_id: ID,
    pub date: String,
    pub time: String,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidDate(String),
    InvalidTime(String),
    NonexistentLocalTime(String, String),
    ExpertNotFound(ID),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidDate(date) => Self::Validation(format!(
                "The date: {} is not valid, it should be formatted as YYYY-MM-DD.",
                date
            )),
            UseCaseError::InvalidTime(time) => Self::Validation(format!(
                "The time: {} is not valid, it should be formatted as HH:MM.",
                time
            )),
            UseCaseError::NonexistentLocalTime(date, time) => Self::Validation(format!(
                "The time {} does not exist on {} in the region timezone.",
                time, date
            )),
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<ResolverError> for UseCaseError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::ExpertNotFound(id) => Self::ExpertNotFound(id),
            ResolverError::Storage(e) => Self::Storage(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckAvailabilityUseCase {
    type Response = AvailabilityDTO;

    type Error = UseCaseError;

    const NAME: &'static str = "CheckAvailability";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let date =
            parse_date(&self.date).map_err(|_| UseCaseError::InvalidDate(self.date.clone()))?;
        let minute: MinuteOfDay = self
            .time
            .parse()
            .map_err(|_| UseCaseError::InvalidTime(self.time.clone()))?;
        let instant = local_to_utc(&date, minute, &ctx.config.timezone).ok_or_else(|| {
            UseCaseError::NonexistentLocalTime(self.date.clone(), self.time.clone())
        })?;

        let available = is_available(ctx, &self.expert_id, &instant).await?;

        Ok(AvailabilityDTO {
            expert_id: self.expert_id.clone(),
            date: format_date(&date),
            time: minute.to_string(),
            available,
        })
    }
}
