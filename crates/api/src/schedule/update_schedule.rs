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
use consultation_booking_api_structs::update_schedule::*;
use consultation_booking_domain::{Actor, Schedule, ID};
use consultation_booking_infra::BookingContext;

pub async fn update_schedule_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = UpdateScheduleUseCase {
        actor,
        schedule_id: path.schedule_id.clone(),
        day_of_week: body.day_of_week,
        start_time: body.start_time,
        end_time: body.end_time,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|schedule| HttpResponse::Ok().json(APIResponse::from_schedule(schedule)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct UpdateScheduleUseCase {
    pub actor: Actor,
    pub schedule_id: ID,
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotOwner,
    Deactivated(ID),
    InvalidWindow(WindowError),
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
            UseCaseError::Deactivated(id) => Self::Validation(format!(
                "The schedule with id: {}, is deactivated and can not be changed.",
                id
            )),
            UseCaseError::InvalidWindow(e) => Self::Validation(e.message()),
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
impl UseCase for UpdateScheduleUseCase {
    type Response = Schedule;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateSchedule";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let mut schedule = bounded(ctx, ctx.repos.schedules.find(&self.schedule_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.schedule_id.clone()))?;
        if !self.actor.acts_for_expert(&schedule.expert_id) {
            return Err(UseCaseError::NotOwner);
        }
        if !schedule.is_active {
            return Err(UseCaseError::Deactivated(schedule.id));
        }

        let now = ctx.sys.now();
        if let Some(day) = self.day_of_week {
            schedule
                .set_day_of_week(day, now)
                .map_err(WindowError::Invalid)?;
        }
        let start = match &self.start_time {
            Some(time) => parse_time(time)?,
            None => schedule.start,
        };
        let end = match &self.end_time {
            Some(time) => parse_time(time)?,
            None => schedule.end,
        };
        schedule
            .set_window(start, end, now)
            .map_err(WindowError::Invalid)?;

        bounded(ctx, ctx.repos.schedules.save(&schedule))
            .await
            .map_err(UseCaseError::Storage)?;
        ctx.cache.invalidate_expert(&schedule.expert_id).await;

        Ok(schedule)
    }
}

impl PermissionBoundary for UpdateScheduleUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSchedules]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{admin, date, expert_actor, seed_expert, setup};

    async fn monday_schedule(ctx: &BookingContext, expert_id: &ID) -> Schedule {
        ctx.repos
            .schedules
            .find_by_expert(expert_id)
            .await
            .unwrap()
            .remove(0)
    }

    #[actix_web::test]
    async fn moves_the_window_and_invalidates() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let schedule = monday_schedule(&ctx, &expert.id).await;
        ctx.cache.set(&expert.id, &date(2025, 6, 2), true).await;

        let mut usecase = UpdateScheduleUseCase {
            actor: expert_actor(&expert),
            schedule_id: schedule.id.clone(),
            day_of_week: Some(2),
            start_time: None,
            end_time: Some("14:00".into()),
        };
        let updated = usecase.execute(&ctx).await.unwrap();
        assert_eq!(updated.day_of_week, 2);
        assert_eq!(updated.start.to_string(), "09:00");
        assert_eq!(updated.end.to_string(), "14:00");
        assert_eq!(ctx.cache.get(&expert.id, &date(2025, 6, 2)).await, None);
    }

    #[actix_web::test]
    async fn rejects_empty_windows() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let schedule = monday_schedule(&ctx, &expert.id).await;

        let mut usecase = UpdateScheduleUseCase {
            actor: admin(),
            schedule_id: schedule.id.clone(),
            day_of_week: None,
            start_time: Some("12:00".into()),
            end_time: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidWindow(_))
        ));
        let stored = ctx.repos.schedules.find(&schedule.id).await.unwrap().unwrap();
        assert_eq!(stored.start.to_string(), "09:00");
    }
}
