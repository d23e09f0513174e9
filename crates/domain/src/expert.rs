use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertStatus {
    Active,
    Inactive,
}

impl ExpertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl Display for ExpertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Invalid expert status: {}", s)),
        }
    }
}

/// A service provider that `Booking`s are made with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expert {
    pub id: ID,
    pub name: String,
    pub email: String,
    /// Specialization tag used for lookups
    pub expertise: String,
    pub status: ExpertStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Expert {
    pub fn new(name: String, email: String, expertise: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            name,
            email,
            expertise,
            status: ExpertStatus::Active,
            created: now,
            updated: now,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.status == ExpertStatus::Active
    }
}

impl Entity for Expert {
    fn id(&self) -> &ID {
        &self.id
    }
}
