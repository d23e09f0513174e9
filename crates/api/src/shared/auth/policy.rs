use consultation_booking_domain::ActorRole;
use serde::{Deserialize, Serialize};

/// A Policy comes with the role of an `Actor` and decides which actions it can and cannot take.
///
/// Every `UseCase` contains a list of `Permission`s that is required
/// for an `Actor` to execute it, if the `Actor`s `Policy` is not authorized
/// some of these `Permission`s the request will be rejected. Ownership of the
/// touched resources is checked by the `UseCase` itself.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Policy {
    /// `Permission`s allowed by the `Policy`
    allow: Option<Vec<Permission>>,
    /// `Permission`s rejected by the `Policy`
    reject: Option<Vec<Permission>>,
}

impl Policy {
    pub fn for_role(role: ActorRole) -> Self {
        use Permission::*;

        let allow = match role {
            ActorRole::Admin | ActorRole::System => vec![All],
            ActorRole::Expert => vec![
                UpdateExpert,
                ManageSchedules,
                ManageOffTimes,
                ReadBookings,
                UpdateBooking,
                UpdateBookingStatus,
            ],
            ActorRole::User => vec![
                CreateBooking,
                ReadBookings,
                UpdateBooking,
                UpdateBookingStatus,
            ],
        };
        Self {
            allow: Some(allow),
            reject: None,
        }
    }

    /// Checks if this `Policy` has the right to list of `Permission`s
    pub fn authorize(&self, permissions: &[Permission]) -> bool {
        if permissions.is_empty() {
            return true;
        }

        if let Some(rejected) = &self.reject {
            for rejected_permission in rejected {
                if *rejected_permission == Permission::All {
                    return false;
                }
                if permissions.contains(rejected_permission) {
                    return false;
                }
            }
        }

        if let Some(allowed) = &self.allow {
            if allowed.contains(&Permission::All) {
                return true;
            }

            // Check that all permissions are in allowed
            for permission in permissions {
                if !allowed.contains(permission) {
                    return false;
                }
            }

            return true;
        }

        false
    }
}

/// `Permission` are different kind of actions that can be performed.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum Permission {
    #[serde(rename = "*")]
    All,
    CreateExpert,
    UpdateExpert,
    DeleteExpert,
    ManageSchedules,
    ManageOffTimes,
    CreateBooking,
    ReadBookings,
    UpdateBooking,
    UpdateBookingStatus,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn permissions() {
        let policy = Policy::default();
        assert!(policy.authorize(&Vec::new()));
        assert!(!policy.authorize(&vec![Permission::CreateBooking]));

        let policy = Policy {
            allow: Some(vec![Permission::All]),
            reject: Some(vec![Permission::CreateBooking]),
        };
        assert!(!policy.authorize(&vec![Permission::CreateBooking]));
        assert!(policy.authorize(&vec![Permission::DeleteExpert]));

        let policy = Policy {
            allow: Some(vec![Permission::CreateBooking, Permission::UpdateBooking]),
            reject: Some(vec![Permission::UpdateBooking]),
        };
        assert!(policy.authorize(&vec![Permission::CreateBooking]));
        assert!(!policy.authorize(&vec![
            Permission::CreateBooking,
            Permission::UpdateBooking
        ]));

        let policy = Policy {
            allow: Some(vec![Permission::CreateBooking]),
            reject: Some(vec![Permission::All]),
        };
        assert!(!policy.authorize(&vec![Permission::CreateBooking]));
    }

    #[test]
    fn role_policies() {
        let user = Policy::for_role(ActorRole::User);
        assert!(user.authorize(&[Permission::CreateBooking]));
        assert!(!user.authorize(&[Permission::ManageSchedules]));
        assert!(!user.authorize(&[Permission::CreateExpert]));

        let expert = Policy::for_role(ActorRole::Expert);
        assert!(expert.authorize(&[Permission::ManageSchedules, Permission::ManageOffTimes]));
        assert!(!expert.authorize(&[Permission::CreateBooking]));
        assert!(!expert.authorize(&[Permission::DeleteExpert]));

        let admin = Policy::for_role(ActorRole::Admin);
        assert!(admin.authorize(&[Permission::CreateExpert, Permission::DeleteExpert]));
    }
}
