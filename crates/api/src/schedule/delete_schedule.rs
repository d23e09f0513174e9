use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::delete_schedule::*;
use consultation_booking_domain::{Actor, Schedule, ID};
use consultation_booking_infra::BookingContext;

pub async fn delete_schedule_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = DeleteScheduleUseCase {
        actor,
        schedule_id: path.schedule_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|schedule| HttpResponse::Ok().json(APIResponse::from_schedule(schedule)))
        .map_err(BookingError::from)
}

/// Schedules are deactivated, never removed
#[derive(Debug)]
struct DeleteScheduleUseCase {
    pub actor: Actor,
    pub schedule_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotOwner,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The schedule with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can manage schedules.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteScheduleUseCase {
    type Response = Schedule;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteSchedule";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let schedule = bounded(ctx, ctx.repos.schedules.find(&self.schedule_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.schedule_id.clone()))?;
        if !self.actor.acts_for_expert(&schedule.expert_id) {
            return Err(UseCaseError::NotOwner);
        }

        let schedule = bounded(
            ctx,
            ctx.repos.schedules.deactivate(&schedule.id, ctx.sys.now()),
        )
        .await
        .map_err(UseCaseError::Storage)?
        .ok_or_else(|| UseCaseError::NotFound(self.schedule_id.clone()))?;
        ctx.cache.invalidate_expert(&schedule.expert_id).await;

        Ok(schedule)
    }
}

impl PermissionBoundary for DeleteScheduleUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSchedules]
    }
}
