use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::create_off_time::*;
use consultation_booking_domain::{date::parse_date, Actor, InvalidOffTimeError, OffTime, ID};
use consultation_booking_infra::BookingContext;

pub async fn create_off_time_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateOffTimeUseCase {
        actor,
        expert_id: body.expert_id,
        start_date: body.start_date,
        end_date: body.end_date,
        reason: body.reason,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|off_time| HttpResponse::Created().json(APIResponse::from_off_time(off_time)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct CreateOffTimeUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidDate(String),
    InvalidRange(InvalidOffTimeError),
    ExpertNotFound(ID),
    NotOwner,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidDate(date) => Self::Validation(format!(
                "The date: {} is not valid, it should be formatted as YYYY-MM-DD.",
                date
            )),
            UseCaseError::InvalidRange(e) => Self::Validation(e.to_string()),
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can manage off times.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateOffTimeUseCase {
    type Response = OffTime;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateOffTime";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if !self.actor.acts_for_expert(&self.expert_id) {
            return Err(UseCaseError::NotOwner);
        }
        let start_date = parse_date(self.start_date.trim())
            .map_err(|_| UseCaseError::InvalidDate(self.start_date.clone()))?;
        let end_date = parse_date(self.end_date.trim())
            .map_err(|_| UseCaseError::InvalidDate(self.end_date.clone()))?;
        let reason = self
            .reason
            .as_ref()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let off_time = OffTime::new(
            self.expert_id.clone(),
            start_date,
            end_date,
            reason,
            ctx.sys.now(),
        )
        .map_err(UseCaseError::InvalidRange)?;

        let expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if expert.is_none() {
            return Err(UseCaseError::ExpertNotFound(self.expert_id.clone()));
        }

        bounded(ctx, ctx.repos.off_times.insert(&off_time))
            .await
            .map_err(UseCaseError::Storage)?;
        ctx.cache.invalidate_expert(&self.expert_id).await;

        Ok(off_time)
    }
}

impl PermissionBoundary for CreateOffTimeUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageOffTimes]
    }
}
