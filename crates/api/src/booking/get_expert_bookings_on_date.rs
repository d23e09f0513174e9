use super::to_dto;
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::get_expert_bookings_on_date::*;
use consultation_booking_domain::{date::parse_date, Actor, Booking, ID};
use consultation_booking_infra::BookingContext;

pub async fn get_expert_bookings_on_date_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let path = path.into_inner();
    let usecase = GetExpertBookingsOnDateUseCase {
        actor,
        expert_id: path.expert_id,
        date: path.date,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|bookings| {
            let bookings = bookings.into_iter().map(|b| to_dto(&ctx, b)).collect();
            HttpResponse::Ok().json(APIResponse::new(bookings))
        })
        .map_err(BookingError::from)
}

/// Bookings of an expert starting on a date of the region, earliest first
#[derive(Debug)]
struct GetExpertBookingsOnDateUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub date: String,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidDate(String),
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
            UseCaseError::NotOwner => {
                Self::Forbidden("Only the expert or an admin can list these bookings.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpertBookingsOnDateUseCase {
    type Response = Vec<Booking>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetExpertBookingsOnDate";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if !self.actor.acts_for_expert(&self.expert_id) {
            return Err(UseCaseError::NotOwner);
        }
        let date = parse_date(self.date.trim())
            .map_err(|_| UseCaseError::InvalidDate(self.date.clone()))?;

        bounded(
            ctx,
            ctx.repos
                .bookings
                .find_by_expert_on_date(&self.expert_id, &date, &ctx.config.timezone),
        )
        .await
        .map_err(UseCaseError::Storage)
    }
}

impl PermissionBoundary for GetExpertBookingsOnDateUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{
        expert_actor, seed_booking_at, seed_expert, setup, user, utc,
    };

    #[actix_web::test]
    async fn lists_one_local_date() {
        let (mut ctx, _) = setup();
        ctx.config.timezone = chrono_tz::Asia::Ho_Chi_Minh;
        let expert = seed_expert(&ctx).await;
        let owner = user();
        // 2025-06-02 23:30 in UTC+7
        seed_booking_at(&ctx, &expert, &owner, utc(2025, 6, 2, 16, 30)).await;
        seed_booking_at(&ctx, &expert, &owner, utc(2025, 6, 2, 3, 0)).await;
        seed_booking_at(&ctx, &expert, &owner, utc(2025, 6, 2, 16, 0)).await;
        // 2025-06-03 00:00 in UTC+7
        seed_booking_at(&ctx, &expert, &owner, utc(2025, 6, 2, 17, 0)).await;

        let mut usecase = GetExpertBookingsOnDateUseCase {
            actor: expert_actor(&expert),
            expert_id: expert.id.clone(),
            date: "2025-06-02".into(),
        };
        let bookings = usecase.execute(&ctx).await.unwrap();
        let starts = bookings.iter().map(|b| b.start_time).collect::<Vec<_>>();
        assert_eq!(
            starts,
            vec![
                utc(2025, 6, 2, 3, 0),
                utc(2025, 6, 2, 16, 0),
                utc(2025, 6, 2, 16, 30)
            ]
        );

        usecase.date = "2025-6-2x".into();
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidDate(_))
        ));
    }
}
