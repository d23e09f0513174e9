use crate::{
    actor::{Actor, ActorRole},
    booking_status::BookingStatus,
    shared::entity::{Entity, ID},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit entry written for every mutation of a `Booking`.
///
/// `from_status` is `None` only for the entry written when the booking
/// is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistory {
    pub id: ID,
    pub booking_id: ID,
    pub from_status: Option<BookingStatus>,
    pub to_status: BookingStatus,
    pub actor_id: ID,
    pub actor_role: ActorRole,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub created: DateTime<Utc>,
}

impl StatusHistory {
    pub fn new(
        booking_id: ID,
        from_status: Option<BookingStatus>,
        to_status: BookingStatus,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            booking_id,
            from_status,
            to_status,
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            note: None,
            reason: None,
            created: now,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty());
        self
    }
}

impl Entity for StatusHistory {
    fn id(&self) -> &ID {
        &self.id
    }
}
