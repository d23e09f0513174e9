use super::{
    admission::{admit, AdmissionError},
    is_party, resolve_span, to_dto, SpanError,
};
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::update_booking::*;
use consultation_booking_domain::{
    Actor, Booking, BookingDetails, BookingDetailsError, BookingMode, BookingStatus, SlotError,
    StatusHistory, ID,
};
use consultation_booking_infra::{BookingContext, WriteOutcome};

pub async fn update_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = UpdateBookingUseCase {
        actor,
        booking_id: path.booking_id.clone(),
        patch: body.0,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|booking| HttpResponse::Ok().json(APIResponse::new(to_dto(&ctx, booking))))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct UpdateBookingUseCase {
    pub actor: Actor,
    pub booking_id: ID,
    pub patch: RequestBody,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotParty,
    Closed(BookingStatus),
    AlreadyStarted,
    TooLate,
    InvalidSpan(SpanError),
    InvalidSlot(SlotError),
    InvalidDetails(BookingDetailsError),
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
                "Only the user, the expert or an admin can update this booking.".into(),
            ),
            UseCaseError::Closed(status) => Self::Validation(format!(
                "A {} booking can not be updated anymore.",
                status
            )),
            UseCaseError::AlreadyStarted => {
                Self::Validation("The booking has already started.".into())
            }
            UseCaseError::TooLate => Self::Validation(
                "Bookings can only be updated at least one hour before they start.".into(),
            ),
            UseCaseError::InvalidSpan(e) => Self::Validation(e.message()),
            UseCaseError::InvalidSlot(e) => Self::Validation(e.to_string()),
            UseCaseError::InvalidDetails(e) => Self::Validation(e.to_string()),
            UseCaseError::Admission(e) => e.into(),
            UseCaseError::StaleStatus => Self::Conflict(
                "The booking was changed by someone else, please reload it and retry.".into(),
            ),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

impl UpdateBookingUseCase {
    fn changes_span(&self) -> bool {
        self.patch.start_time.is_some()
            || self.patch.end_time.is_some()
            || self.patch.duration_minutes.is_some()
    }

    fn merged_details(&self, booking: &Booking) -> BookingDetails {
        let mode = self.patch.mode.unwrap_or(booking.mode);
        let location = match (&self.patch.location, mode) {
            (Some(location), _) => Some(location.clone()),
            (None, BookingMode::Online) => None,
            (None, BookingMode::Offline) => booking.location.clone(),
        };
        BookingDetails {
            mode,
            location,
            meeting_link: self
                .patch
                .meeting_link
                .clone()
                .or_else(|| booking.meeting_link.clone()),
            notes: self.patch.notes.clone().or_else(|| booking.notes.clone()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateBookingUseCase {
    type Response = Booking;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateBooking";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let mut booking = bounded(ctx, ctx.repos.bookings.find(&self.booking_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.booking_id.clone()))?;
        if !is_party(&self.actor, &booking) {
            return Err(UseCaseError::NotParty);
        }
        if booking.status.is_terminal() {
            return Err(UseCaseError::Closed(booking.status));
        }
        let now = ctx.sys.now();
        let rules = &ctx.config.booking_rules;
        if booking.start_time <= now {
            return Err(UseCaseError::AlreadyStarted);
        }
        if !self.actor.is_admin() && !rules.has_cancel_lead(booking.start_time, now) {
            return Err(UseCaseError::TooLate);
        }

        let mut moved = false;
        if self.changes_span() {
            let start = self.patch.start_time.unwrap_or(booking.start_time);
            let (end, duration) = match (self.patch.end_time, self.patch.duration_minutes) {
                (None, None) => (None, Some(booking.duration_minutes())),
                given => given,
            };
            let span = resolve_span(start, end, duration).map_err(UseCaseError::InvalidSpan)?;
            if span != booking.timespan() {
                rules
                    .validate_slot(&span, now)
                    .map_err(UseCaseError::InvalidSlot)?;
                booking.set_timespan(&span);
                moved = true;
            }
        }
        let details = self
            .merged_details(&booking)
            .validate()
            .map_err(UseCaseError::InvalidDetails)?;
        booking.set_details(details);
        booking.updated = now;

        let status = booking.status;
        let history = StatusHistory::new(booking.id.clone(), Some(status), status, &self.actor, now)
            .with_note(Some("updated".into()));

        if moved {
            admit(
                ctx,
                &booking,
                Some(&booking.id),
                ctx.repos
                    .bookings
                    .save_with_history(&booking, status, &history, true),
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
                    .save_with_history(&booking, status, &history, false),
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

        Ok(booking)
    }
}

impl PermissionBoundary for UpdateBookingUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::UpdateBooking]
    }
}
