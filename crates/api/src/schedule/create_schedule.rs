use super::{parse_time, WindowError};
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::create_schedule::*;
use consultation_booking_domain::{Actor, Schedule, ID};
use consultation_booking_infra::BookingContext;

pub async fn create_schedule_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let mut days_of_week = body.days_of_week.unwrap_or_default();
    if let Some(day) = body.day_of_week {
        days_of_week.push(day);
    }
    let usecase = CreateScheduleUseCase {
        actor,
        expert_id: body.expert_id,
        days_of_week,
        start_time: body.start_time,
        end_time: body.end_time,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|schedules| HttpResponse::Created().json(APIResponse::from_schedules(schedules)))
        .map_err(BookingError::from)
}

/// Creates one schedule per given day with the same window
#[derive(Debug)]
struct CreateScheduleUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub days_of_week: Vec<i64>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug)]
enum UseCaseError {
    NoDays,
    InvalidWindow(WindowError),
    ExpertNotFound(ID),
    NotOwner,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NoDays => {
                Self::Validation("Either day_of_week or days_of_week must be given.".into())
            }
            UseCaseError::InvalidWindow(e) => Self::Validation(e.message()),
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can manage schedules.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<WindowError> for UseCaseError {
    fn from(e: WindowError) -> Self {
        Self::InvalidWindow(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateScheduleUseCase {
    type Response = Vec<Schedule>;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateSchedule";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if !self.actor.acts_for_expert(&self.expert_id) {
            return Err(UseCaseError::NotOwner);
        }
        let mut days = self.days_of_week.clone();
        days.sort_unstable();
        days.dedup();
        if days.is_empty() {
            return Err(UseCaseError::NoDays);
        }
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;

        let now = ctx.sys.now();
        let schedules = days
            .into_iter()
            .map(|day| Schedule::new(self.expert_id.clone(), day, start, end, now))
            .collect::<Result<Vec<_>, _>>()
            .map_err(WindowError::Invalid)?;

        let expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if expert.is_none() {
            return Err(UseCaseError::ExpertNotFound(self.expert_id.clone()));
        }

        for schedule in &schedules {
            bounded(ctx, ctx.repos.schedules.insert(schedule))
                .await
                .map_err(UseCaseError::Storage)?;
        }
        ctx.cache.invalidate_expert(&self.expert_id).await;

        Ok(schedules)
    }
}

impl PermissionBoundary for CreateScheduleUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSchedules]
    }
}
