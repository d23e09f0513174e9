use crate::actor::ActorRole;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
    Missed,
}

use ActorRole::{Admin, Expert, System, User};
use BookingStatus::*;

/// Every permitted move and the roles that may drive it
const TRANSITIONS: &[(BookingStatus, BookingStatus, &[ActorRole])] = &[
    (Pending, Confirmed, &[Expert, Admin]),
    (Pending, Rejected, &[Expert, Admin]),
    (Pending, Cancelled, &[User, Expert, Admin]),
    (Pending, Missed, &[Admin, System]),
    (Confirmed, Completed, &[Expert, Admin]),
    (Confirmed, Cancelled, &[User, Expert, Admin]),
    (Confirmed, Missed, &[Admin, System]),
    (Rejected, Pending, &[Admin]),
    (Rejected, Confirmed, &[Admin]),
    (Cancelled, Pending, &[Admin]),
    (Cancelled, Confirmed, &[Admin]),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A booking can not move from {from} to {to}")]
    NotAllowed {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("The {role} role is not permitted to move a booking from {from} to {to}")]
    Forbidden {
        from: BookingStatus,
        to: BookingStatus,
        role: ActorRole,
    },
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Rejected => "rejected",
            Cancelled => "cancelled",
            Completed => "completed",
            Missed => "missed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Rejected | Cancelled | Completed | Missed)
    }

    /// Bookings in these states hold their slot and take part in
    /// conflict detection
    pub fn occupies_slot(&self) -> bool {
        matches!(self, Pending | Confirmed)
    }

    pub fn slot_holding() -> [BookingStatus; 2] {
        [Pending, Confirmed]
    }

    /// Checks that `role` may move a booking from `self` to `to`
    pub fn transition(&self, to: BookingStatus, role: ActorRole) -> Result<(), TransitionError> {
        let rule = TRANSITIONS
            .iter()
            .find(|(from, target, _)| from == self && *target == to);

        match rule {
            None => Err(TransitionError::NotAllowed { from: *self, to }),
            Some((_, _, roles)) if !roles.contains(&role) => Err(TransitionError::Forbidden {
                from: *self,
                to,
                role,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Pending),
            "confirmed" => Ok(Confirmed),
            "rejected" => Ok(Rejected),
            "cancelled" => Ok(Cancelled),
            "completed" => Ok(Completed),
            "missed" => Ok(Missed),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}
