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
use chrono::{DateTime, Utc};
use consultation_booking_api_structs::check_booking_conflicts::*;
use consultation_booking_domain::{Actor, ActorRole, Booking, TimeSpan, ID};
use consultation_booking_infra::BookingContext;

pub async fn check_booking_conflicts_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CheckBookingConflictsUseCase {
        actor,
        expert_id: body.expert_id,
        start_time: body.start_time,
        end_time: body.end_time,
        exclude_id: body.exclude_id,
        user_id: body.user_id,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse::new(ConflictsDTO {
                has_conflict: res.expert_conflict || res.user_conflict,
                expert_conflict: res.expert_conflict,
                user_conflict: res.user_conflict,
                conflicts: res.conflicts.into_iter().map(|b| to_dto(&ctx, b)).collect(),
            }))
        })
        .map_err(BookingError::from)
}

/// Read only probe of the conflict predicates used during admission
#[derive(Debug)]
struct CheckBookingConflictsUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exclude_id: Option<ID>,
    /// Defaults to the acting user
    pub user_id: Option<ID>,
}

#[derive(Debug)]
struct Conflicts {
    expert_conflict: bool,
    user_conflict: bool,
    conflicts: Vec<Booking>,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidSpan,
    NotOwnUser,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidSpan => {
                Self::Validation("The end_time must be after the start_time.".into())
            }
            UseCaseError::NotOwnUser => {
                Self::Forbidden("Users can only check their own bookings for conflicts.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckBookingConflictsUseCase {
    type Response = Conflicts;

    type Error = UseCaseError;

    const NAME: &'static str = "CheckBookingConflicts";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let span =
            TimeSpan::new(self.start_time, self.end_time).map_err(|_| UseCaseError::InvalidSpan)?;
        let user_id = match (self.actor.role, &self.user_id) {
            (ActorRole::User, Some(user_id)) if *user_id != self.actor.id => {
                return Err(UseCaseError::NotOwnUser)
            }
            (ActorRole::User, _) => Some(self.actor.id.clone()),
            (_, user_id) => user_id.clone(),
        };
        let exclude = self.exclude_id.as_ref();

        let conflicts = bounded(
            ctx,
            ctx.repos
                .bookings
                .find_expert_conflicts(&self.expert_id, &span, exclude),
        )
        .await
        .map_err(UseCaseError::Storage)?;
        let user_conflict = match &user_id {
            Some(user_id) => bounded(
                ctx,
                ctx.repos.bookings.has_user_conflict(user_id, &span, exclude),
            )
            .await
            .map_err(UseCaseError::Storage)?,
            None => false,
        };

        let expert_conflict = !conflicts.is_empty();
        // Other users' bookings are not disclosed
        let conflicts = if self.actor.acts_for_expert(&self.expert_id) {
            conflicts
        } else {
            Vec::new()
        };
        Ok(Conflicts {
            expert_conflict,
            user_conflict,
            conflicts,
        })
    }
}

impl PermissionBoundary for CheckBookingConflictsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{
        expert_actor, seed_booking, seed_expert, setup, user, utc,
    };

    fn probe(
        actor: &Actor,
        expert_id: &ID,
        hour: u32,
        minute: u32,
    ) -> CheckBookingConflictsUseCase {
        let start = utc(2025, 6, 2, hour, minute);
        CheckBookingConflictsUseCase {
            actor: actor.clone(),
            expert_id: expert_id.clone(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            exclude_id: None,
            user_id: None,
        }
    }

    #[actix_web::test]
    async fn reports_expert_and_user_conflicts() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;

        let res = probe(&owner, &expert.id, 10, 15).execute(&ctx).await.unwrap();
        assert!(res.expert_conflict && res.user_conflict);
        assert!(res.conflicts.is_empty());

        let res = probe(&expert_actor(&expert), &expert.id, 10, 15)
            .execute(&ctx)
            .await
            .unwrap();
        assert!(res.expert_conflict);
        assert!(!res.user_conflict);
        assert_eq!(res.conflicts, vec![booking.clone()]);

        let res = probe(&user(), &expert.id, 10, 30).execute(&ctx).await.unwrap();
        assert!(!res.expert_conflict && !res.user_conflict);

        let mut excluded = probe(&owner, &expert.id, 10, 0);
        excluded.exclude_id = Some(booking.id.clone());
        let res = excluded.execute(&ctx).await.unwrap();
        assert!(!res.expert_conflict && !res.user_conflict);
    }

    #[actix_web::test]
    async fn users_probe_themselves_only() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let mut usecase = probe(&user(), &expert.id, 10, 0);
        usecase.user_id = Some(ID::new());
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotOwnUser)
        ));
    }
}
