use chrono::{DateTime, Utc};
use consultation_booking_domain::{
    ActorRole, Booking, BookingMode, BookingRules, BookingStatus, StatusHistory, ID,
};
use serde::{Deserialize, Serialize};

/// A stored `Booking` with the flags derived from it at response time
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingDTO {
    pub id: ID,
    pub expert_id: ID,
    pub user_id: ID,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub mode: BookingMode,
    pub status: BookingStatus,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub can_be_cancelled: bool,
    pub can_be_confirmed: bool,
    pub is_expired: bool,
    pub duration_minutes: i64,
}

impl BookingDTO {
    pub fn new(booking: Booking, rules: &BookingRules, now: DateTime<Utc>) -> Self {
        Self {
            can_be_cancelled: booking.can_be_cancelled(rules, now),
            can_be_confirmed: booking.can_be_confirmed(),
            is_expired: booking.is_expired(now),
            duration_minutes: booking.duration_minutes(),
            id: booking.id,
            expert_id: booking.expert_id,
            user_id: booking.user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            mode: booking.mode,
            status: booking.status,
            location: booking.location,
            meeting_link: booking.meeting_link,
            notes: booking.notes,
            created_at: booking.created,
            updated_at: booking.updated,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusHistoryDTO {
    pub id: ID,
    pub booking_id: ID,
    pub from_status: Option<BookingStatus>,
    pub to_status: BookingStatus,
    pub actor_id: ID,
    pub actor_role: ActorRole,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StatusHistoryDTO {
    pub fn new(history: StatusHistory) -> Self {
        Self {
            id: history.id,
            booking_id: history.booking_id,
            from_status: history.from_status,
            to_status: history.to_status,
            actor_id: history.actor_id,
            actor_role: history.actor_role,
            note: history.note,
            reason: history.reason,
            created_at: history.created,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BookingStatsDTO {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub completed: i64,
    pub missed: i64,
    pub online: i64,
    pub offline: i64,
}
