use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::delete_off_time::*;
use consultation_booking_domain::{Actor, OffTime, ID};
use consultation_booking_infra::BookingContext;

pub async fn delete_off_time_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = DeleteOffTimeUseCase {
        actor,
        off_time_id: path.off_time_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|off_time| HttpResponse::Ok().json(APIResponse::from_off_time(off_time)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct DeleteOffTimeUseCase {
    pub actor: Actor,
    pub off_time_id: ID,
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
                Self::NotFound(format!("The off time with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can manage off times.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteOffTimeUseCase {
    type Response = OffTime;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteOffTime";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let off_time = bounded(ctx, ctx.repos.off_times.find(&self.off_time_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.off_time_id.clone()))?;
        if !self.actor.acts_for_expert(&off_time.expert_id) {
            return Err(UseCaseError::NotOwner);
        }

        let deleted = bounded(ctx, ctx.repos.off_times.delete(&off_time.id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.off_time_id.clone()))?;
        ctx.cache.invalidate_expert(&deleted.expert_id).await;

        Ok(deleted)
    }
}

impl PermissionBoundary for DeleteOffTimeUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageOffTimes]
    }
}
