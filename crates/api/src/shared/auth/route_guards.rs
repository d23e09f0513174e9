use super::Policy;
use crate::error::BookingError;
use actix_web::HttpRequest;
use consultation_booking_domain::{Actor, ActorRole, ID};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, BookingError> {
    let value = req.headers().get(name).ok_or_else(|| {
        BookingError::Unauthorized(format!("Missing the `{}` header", name))
    })?;
    value.to_str().map_err(|_| {
        BookingError::Unauthorized(format!("The `{}` header is not valid text", name))
    })
}

/// Identifies the caller and the `Policy` that comes with their role.
///
/// The `system` role is reserved for background jobs and can not be
/// claimed by a request.
pub fn protect_route(req: &HttpRequest) -> Result<(Actor, Policy), BookingError> {
    let id = header(req, ACTOR_ID_HEADER)?
        .parse::<ID>()
        .map_err(|_| BookingError::Unauthorized("Malformed actor id".into()))?;
    let role = header(req, ACTOR_ROLE_HEADER)?
        .parse::<ActorRole>()
        .map_err(BookingError::Unauthorized)?;
    if role == ActorRole::System {
        return Err(BookingError::Unauthorized(
            "The system role can not be used by clients".into(),
        ));
    }

    let policy = Policy::for_role(role);
    Ok((Actor::new(id, role), policy))
}
