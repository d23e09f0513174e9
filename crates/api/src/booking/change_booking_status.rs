use super::{
    admission::{admit, AdmissionError},
    is_party,
    subscribers::PublishStatusChanged,
    to_dto,
};
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, Subscriber, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::update_booking_status::*;
use consultation_booking_domain::{
    validate_meeting_link, Actor, ActorRole, BookingDetailsError, BookingStatus, BookingStatusChanged,
    StatusHistory, TransitionError, ID,
};
use consultation_booking_infra::{BookingContext, WriteOutcome};

pub async fn update_booking_status_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let to = body
        .status
        .trim()
        .to_lowercase()
        .parse::<BookingStatus>()
        .map_err(BookingError::Validation)?;
    let usecase = ChangeBookingStatusUseCase {
        actor,
        booking_id: path.booking_id.clone(),
        to,
        note: body.note,
        reason: body.reason,
        meeting_link: body.meeting_link,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|changed| HttpResponse::Ok().json(APIResponse::new(to_dto(&ctx, changed.booking))))
        .map_err(BookingError::from)
}

/// Moves a booking along the status state machine
#[derive(Debug)]
pub struct ChangeBookingStatusUseCase {
    pub actor: Actor,
    pub booking_id: ID,
    pub to: BookingStatus,
    pub note: Option<String>,
    pub reason: Option<String>,
    /// Only accepted when confirming
    pub meeting_link: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    NotParty,
    Transition(TransitionError),
    TooLateToCancel,
    MissingReason,
    MeetingLinkNotExpected,
    InvalidMeetingLink(BookingDetailsError),
    Admission(AdmissionError),
    StaleStatus,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::NotParty => Self::Forbidden(
                "Only the user, the expert or an admin can change this booking.".into(),
            ),
            UseCaseError::Transition(e @ TransitionError::NotAllowed { .. }) => {
                Self::InvalidTransition(e.to_string())
            }
            UseCaseError::Transition(e @ TransitionError::Forbidden { .. }) => {
                Self::Forbidden(e.to_string())
            }
            UseCaseError::TooLateToCancel => Self::Validation(
                "Bookings can only be cancelled at least one hour before they start.".into(),
            ),
            UseCaseError::MissingReason => {
                Self::Validation("A reason is required to reject a booking.".into())
            }
            UseCaseError::MeetingLinkNotExpected => Self::Validation(
                "A meeting link can only be attached when confirming a booking.".into(),
            ),
            UseCaseError::InvalidMeetingLink(e) => Self::Validation(e.to_string()),
            UseCaseError::Admission(e) => e.into(),
            UseCaseError::StaleStatus => Self::Conflict(
                "The booking status was changed by someone else, please reload it and retry."
                    .into(),
            ),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ChangeBookingStatusUseCase {
    type Response = BookingStatusChanged;

    type Error = UseCaseError;

    const NAME: &'static str = "ChangeBookingStatus";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let mut booking = bounded(ctx, ctx.repos.bookings.find(&self.booking_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.booking_id.clone()))?;
        let is_system = self.actor.role == ActorRole::System;
        if !is_system && !is_party(&self.actor, &booking) {
            return Err(UseCaseError::NotParty);
        }

        let from = booking.status;
        from.transition(self.to, self.actor.role)
            .map_err(UseCaseError::Transition)?;

        let now = ctx.sys.now();
        if self.to == BookingStatus::Cancelled
            && !self.actor.is_admin()
            && !ctx
                .config
                .booking_rules
                .has_cancel_lead(booking.start_time, now)
        {
            return Err(UseCaseError::TooLateToCancel);
        }
        let reason = self
            .reason
            .as_ref()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if self.to == BookingStatus::Rejected && reason.is_none() {
            return Err(UseCaseError::MissingReason);
        }
        let meeting_link = self
            .meeting_link
            .as_ref()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty());
        if let Some(link) = meeting_link {
            if self.to != BookingStatus::Confirmed {
                return Err(UseCaseError::MeetingLinkNotExpected);
            }
            validate_meeting_link(link).map_err(UseCaseError::InvalidMeetingLink)?;
            booking.meeting_link = Some(link.to_string());
        }

        booking.status = self.to;
        booking.updated = now;
        let history =
            StatusHistory::new(booking.id.clone(), Some(from), self.to, &self.actor, now)
                .with_note(self.note.clone())
                .with_reason(reason);

        if from.is_terminal() && self.to.occupies_slot() {
            // Reactivated bookings claim their slot again
            admit(
                ctx,
                &booking,
                Some(&booking.id),
                ctx.repos
                    .bookings
                    .save_with_history(&booking, from, &history, true),
            )
            .await
            .map_err(|e| match e {
                AdmissionError::Stale => UseCaseError::StaleStatus,
                e => UseCaseError::Admission(e),
            })?;
        } else {
            let outcome = bounded(
                ctx,
                ctx.repos
                    .bookings
                    .save_with_history(&booking, from, &history, false),
            )
            .await
            .map_err(UseCaseError::Storage)?;
            match outcome {
                WriteOutcome::Written => (),
                WriteOutcome::Missing => {
                    return Err(UseCaseError::NotFound(self.booking_id.clone()))
                }
                _ => return Err(UseCaseError::StaleStatus),
            }
        }
        ctx.cache.invalidate_expert(&booking.expert_id).await;

        Ok(BookingStatusChanged {
            from: Some(from),
            to: self.to,
            actor: self.actor.clone(),
            at: now,
            booking,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(PublishStatusChanged)]
    }
}

impl PermissionBoundary for ChangeBookingStatusUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::UpdateBookingStatus]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::{
        test_helpers::{admin, expert_actor, seed_booking, seed_expert, setup, user, utc},
        usecase::execute,
    };
    use chrono::NaiveDate;
    use consultation_booking_domain::Booking;
    use consultation_booking_infra::ChannelBookingEventPublisher;
    use std::sync::Arc;

    fn change(actor: &Actor, booking: &Booking, to: BookingStatus) -> ChangeBookingStatusUseCase {
        ChangeBookingStatusUseCase {
            actor: actor.clone(),
            booking_id: booking.id.clone(),
            to,
            note: None,
            reason: None,
            meeting_link: None,
        }
    }

    #[actix_web::test]
    async fn expert_confirms_with_meeting_link() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tuesday = monday.succ_opt().unwrap();
        ctx.cache.set(&expert.id, &monday, true).await;
        ctx.cache.set(&expert.id, &tuesday, false).await;

        let mut usecase = change(&expert_actor(&expert), &booking, BookingStatus::Confirmed);
        usecase.meeting_link = Some("https://meet.example.com/tax".into());
        usecase.note = Some("See you".into());
        let changed = usecase.execute(&ctx).await.unwrap();
        assert_eq!(changed.from, Some(BookingStatus::Pending));
        assert_eq!(changed.booking.status, BookingStatus::Confirmed);
        assert_eq!(
            changed.booking.meeting_link.as_deref(),
            Some("https://meet.example.com/tax")
        );

        let history = ctx
            .repos
            .status_histories
            .find_by_booking(&booking.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].from_status, Some(BookingStatus::Pending));
        assert_eq!(history[1].to_status, BookingStatus::Confirmed);
        assert_eq!(history[1].note.as_deref(), Some("See you"));

        assert_eq!(ctx.cache.get(&expert.id, &monday).await, None);
        assert_eq!(ctx.cache.get(&expert.id, &tuesday).await, None);
    }

    #[actix_web::test]
    async fn user_can_not_confirm_or_complete() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;

        let res = change(&owner, &booking, BookingStatus::Confirmed)
            .execute(&ctx)
            .await;
        assert!(matches!(
            res,
            Err(UseCaseError::Transition(TransitionError::Forbidden { .. }))
        ));
        let res = change(&owner, &booking, BookingStatus::Completed)
            .execute(&ctx)
            .await;
        assert!(matches!(
            res,
            Err(UseCaseError::Transition(TransitionError::NotAllowed { .. }))
        ));

        let stored = ctx.repos.bookings.find(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        let history = ctx
            .repos
            .status_histories
            .find_by_booking(&booking.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[actix_web::test]
    async fn strangers_are_kept_out() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let other_expert = seed_expert(&ctx).await;
        let booking = seed_booking(&ctx, &expert, &user()).await;

        let res = change(&user(), &booking, BookingStatus::Cancelled)
            .execute(&ctx)
            .await;
        assert!(matches!(res, Err(UseCaseError::NotParty)));
        let res = change(&expert_actor(&other_expert), &booking, BookingStatus::Confirmed)
            .execute(&ctx)
            .await;
        assert!(matches!(res, Err(UseCaseError::NotParty)));
    }

    #[actix_web::test]
    async fn rejection_needs_a_reason() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let booking = seed_booking(&ctx, &expert, &user()).await;
        let actor = expert_actor(&expert);

        let mut blank = change(&actor, &booking, BookingStatus::Rejected);
        blank.reason = Some("  ".into());
        assert!(matches!(
            blank.execute(&ctx).await,
            Err(UseCaseError::MissingReason)
        ));

        let mut usecase = change(&actor, &booking, BookingStatus::Rejected);
        usecase.reason = Some("Double booked".into());
        usecase.execute(&ctx).await.unwrap();
        let history = ctx
            .repos
            .status_histories
            .find_by_booking(&booking.id)
            .await
            .unwrap();
        assert_eq!(history[1].reason.as_deref(), Some("Double booked"));
    }

    #[actix_web::test]
    async fn late_cancellation_is_for_admins_only() {
        let (ctx, sys) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;

        sys.set(utc(2025, 6, 2, 9, 30));
        let res = change(&owner, &booking, BookingStatus::Cancelled)
            .execute(&ctx)
            .await;
        assert!(matches!(res, Err(UseCaseError::TooLateToCancel)));

        let changed = change(&admin(), &booking, BookingStatus::Cancelled)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(changed.booking.status, BookingStatus::Cancelled);
    }

    #[actix_web::test]
    async fn terminal_states_are_final_except_for_admin_reactivation() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;

        change(&owner, &booking, BookingStatus::Cancelled)
            .execute(&ctx)
            .await
            .unwrap();
        let res = change(&owner, &booking, BookingStatus::Pending)
            .execute(&ctx)
            .await;
        assert!(matches!(
            res,
            Err(UseCaseError::Transition(TransitionError::Forbidden { .. }))
        ));

        // Someone else took the freed slot in the meantime
        let taken = seed_booking(&ctx, &expert, &user()).await;
        let res = change(&admin(), &booking, BookingStatus::Confirmed)
            .execute(&ctx)
            .await;
        assert!(matches!(
            res,
            Err(UseCaseError::Admission(AdmissionError::ExpertConflict))
        ));

        change(&admin(), &taken, BookingStatus::Cancelled)
            .execute(&ctx)
            .await
            .unwrap();
        let changed = change(&admin(), &booking, BookingStatus::Confirmed)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(changed.from, Some(BookingStatus::Cancelled));
        assert_eq!(changed.booking.status, BookingStatus::Confirmed);
    }

    #[actix_web::test]
    async fn publishes_every_change() {
        let (mut ctx, _) = setup();
        let (publisher, mut events) = ChannelBookingEventPublisher::new();
        ctx.publisher = Arc::new(publisher);
        let expert = seed_expert(&ctx).await;
        let booking = seed_booking(&ctx, &expert, &user()).await;

        let confirm = change(&expert_actor(&expert), &booking, BookingStatus::Confirmed);
        execute(confirm, &ctx).await.unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event.booking.id, booking.id);
        assert_eq!(event.from, Some(BookingStatus::Pending));
        assert_eq!(event.to, BookingStatus::Confirmed);

        // Failed changes publish nothing
        let again = change(&expert_actor(&expert), &booking, BookingStatus::Confirmed);
        assert!(execute(again, &ctx).await.is_err());
        assert!(events.try_recv().is_err());
    }
}
