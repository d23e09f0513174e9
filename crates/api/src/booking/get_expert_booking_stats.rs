use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::{dtos::BookingStatsDTO, get_expert_booking_stats::*};
use consultation_booking_domain::{Actor, BookingMode, BookingStatus, ID};
use consultation_booking_infra::{BookingContext, BookingCount};

pub async fn get_expert_booking_stats_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = GetExpertBookingStatsUseCase {
        actor,
        expert_id: path.expert_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|stats| HttpResponse::Ok().json(APIResponse::new(stats)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct GetExpertBookingStatsUseCase {
    pub actor: Actor,
    pub expert_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    ExpertNotFound(ID),
    NotOwner,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can see these stats.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

fn tally(counts: &[BookingCount]) -> BookingStatsDTO {
    let mut stats = BookingStatsDTO::default();
    for c in counts {
        stats.total += c.count;
        match c.status {
            BookingStatus::Pending => stats.pending += c.count,
            BookingStatus::Confirmed => stats.confirmed += c.count,
            BookingStatus::Rejected => stats.rejected += c.count,
            BookingStatus::Cancelled => stats.cancelled += c.count,
            BookingStatus::Completed => stats.completed += c.count,
            BookingStatus::Missed => stats.missed += c.count,
        }
        match c.mode {
            BookingMode::Online => stats.online += c.count,
            BookingMode::Offline => stats.offline += c.count,
        }
    }
    stats
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpertBookingStatsUseCase {
    type Response = BookingStatsDTO;

    type Error = UseCaseError;

    const NAME: &'static str = "GetExpertBookingStats";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if !self.actor.acts_for_expert(&self.expert_id) {
            return Err(UseCaseError::NotOwner);
        }
        let expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if expert.is_none() {
            return Err(UseCaseError::ExpertNotFound(self.expert_id.clone()));
        }

        let counts = bounded(ctx, ctx.repos.bookings.count_by_expert(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        Ok(tally(&counts))
    }
}

impl PermissionBoundary for GetExpertBookingStatsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}
