use super::{
    admission::{admit, AdmissionError},
    resolve_span,
    subscribers::PublishBookingCreated,
    to_dto, SpanError,
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
use chrono::{DateTime, Utc};
use consultation_booking_api_structs::create_booking::*;
use consultation_booking_domain::{
    Actor, ActorRole, Booking, BookingDetails, BookingDetailsError, BookingStatus,
    BookingStatusChanged, LocalInstant, SlotError, StatusHistory, ID,
};
use consultation_booking_infra::BookingContext;

pub async fn create_booking_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateBookingUseCase {
        actor,
        expert_id: body.expert_id,
        start_time: body.start_time,
        end_time: body.end_time,
        duration_minutes: body.duration_minutes,
        details: BookingDetails {
            mode: body.mode,
            location: body.location,
            meeting_link: body.meeting_link,
            notes: body.notes,
        },
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|created| {
            HttpResponse::Created().json(APIResponse::new(to_dto(&ctx, created.booking)))
        })
        .map_err(BookingError::from)
}

/// Books a time slot of an expert for the acting user
#[derive(Debug)]
pub struct CreateBookingUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub details: BookingDetails,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotAUser,
    InvalidSpan(SpanError),
    InvalidSlot(SlotError),
    InvalidDetails(BookingDetailsError),
    ExpertNotFound(ID),
    Admission(AdmissionError),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotAUser => Self::Forbidden("Only users can create bookings.".into()),
            UseCaseError::InvalidSpan(e) => Self::Validation(e.message()),
            UseCaseError::InvalidSlot(e) => Self::Validation(e.to_string()),
            UseCaseError::InvalidDetails(e) => Self::Validation(e.to_string()),
            UseCaseError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::Admission(e) => e.into(),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<AdmissionError> for BookingError {
    fn from(e: AdmissionError) -> Self {
        match e {
            AdmissionError::ExpertNotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            AdmissionError::ExpertConflict => {
                Self::Conflict("The expert already has a booking in this time slot.".into())
            }
            AdmissionError::UserConflict => {
                Self::Conflict("You already have a booking in this time slot.".into())
            }
            AdmissionError::OutsideSchedule => Self::Conflict(
                "The expert is not available at the requested time, it is outside schedule."
                    .into(),
            ),
            AdmissionError::LockBusy => {
                Self::LockBusy("Another booking of this time slot is in progress.".into())
            }
            AdmissionError::Stale => Self::Conflict(
                "The booking was changed by someone else, please reload it and retry.".into(),
            ),
            AdmissionError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateBookingUseCase {
    type Response = BookingStatusChanged;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateBooking";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if self.actor.role != ActorRole::User {
            return Err(UseCaseError::NotAUser);
        }
        let now = ctx.sys.now();
        let span = resolve_span(self.start_time, self.end_time, self.duration_minutes)
            .map_err(UseCaseError::InvalidSpan)?;
        ctx.config
            .booking_rules
            .validate_slot(&span, now)
            .map_err(UseCaseError::InvalidSlot)?;
        let details = BookingDetails {
            mode: self.details.mode,
            location: self.details.location.take(),
            meeting_link: self.details.meeting_link.take(),
            notes: self.details.notes.take(),
        }
        .validate()
        .map_err(UseCaseError::InvalidDetails)?;

        let expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?;
        if expert.is_none() {
            return Err(UseCaseError::ExpertNotFound(self.expert_id.clone()));
        }

        let booking = Booking::new(
            self.expert_id.clone(),
            self.actor.id.clone(),
            &span,
            details,
            now,
        );
        let history = StatusHistory::new(
            booking.id.clone(),
            None,
            BookingStatus::Pending,
            &self.actor,
            now,
        );
        admit(
            ctx,
            &booking,
            None,
            ctx.repos.bookings.insert_with_history(&booking, &history),
        )
        .await
        .map_err(UseCaseError::Admission)?;

        // The date stays bookable around the new booking
        let local = LocalInstant::from_utc(&booking.start_time, &ctx.config.timezone);
        ctx.cache.invalidate_expert(&booking.expert_id).await;
        ctx.cache.set(&booking.expert_id, &local.date, true).await;

        Ok(BookingStatusChanged {
            from: None,
            to: BookingStatus::Pending,
            actor: self.actor.clone(),
            at: now,
            booking,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(PublishBookingCreated)]
    }
}

impl PermissionBoundary for CreateBookingUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::CreateBooking]
    }
}
