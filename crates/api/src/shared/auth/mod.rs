mod policy;
mod route_guards;

pub use policy::{Permission, Policy};
pub use route_guards::{protect_route, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
