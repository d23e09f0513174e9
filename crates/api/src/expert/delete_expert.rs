use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::delete_expert::*;
use consultation_booking_domain::{Expert, ID};
use consultation_booking_infra::BookingContext;

pub async fn delete_expert_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (_, policy) = protect_route(&http_req)?;

    let usecase = DeleteExpertUseCase {
        expert_id: path.expert_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|expert| HttpResponse::Ok().json(APIResponse::from_expert(expert)))
        .map_err(BookingError::from)
}

/// Experts that have ever been booked are kept for the booking history,
/// they can only be deactivated
#[derive(Debug)]
struct DeleteExpertUseCase {
    pub expert_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    HasBookings(ID),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::HasBookings(id) => Self::Conflict(format!(
                "The expert with id: {}, has bookings and can only be deactivated.",
                id
            )),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteExpertUseCase {
    type Response = Expert;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteExpert";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let counts = bounded(ctx, ctx.repos.bookings.count_by_expert(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if counts.iter().any(|c| c.count > 0) {
            return Err(UseCaseError::HasBookings(self.expert_id.clone()));
        }

        let expert = bounded(ctx, ctx.repos.experts.delete(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.expert_id.clone()))?;
        ctx.cache.invalidate_expert(&expert.id).await;

        Ok(expert)
    }
}

impl PermissionBoundary for DeleteExpertUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::DeleteExpert]
    }
}
