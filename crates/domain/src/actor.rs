use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    User,
    Expert,
    Admin,
    System,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Expert => "expert",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

impl Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "expert" => Ok(Self::Expert),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            _ => Err(format!("Invalid actor role: {}", s)),
        }
    }
}

/// Whoever is driving an operation. An `Expert` actor's id is the id
/// of the `Expert` entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ID,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: ID, role: ActorRole) -> Self {
        Self { id, role }
    }

    pub fn system() -> Self {
        Self {
            id: ID::from(Uuid::nil()),
            role: ActorRole::System,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// True if the actor is the given expert, or an admin
    pub fn acts_for_expert(&self, expert_id: &ID) -> bool {
        self.is_admin() || (self.role == ActorRole::Expert && self.id == *expert_id)
    }
}
