mod availability;
mod booking;
mod expert;
mod off_time;
mod schedule;
mod shared;
mod status;

pub mod dtos {
    pub use crate::booking::dtos::*;
    pub use crate::expert::dtos::*;
    pub use crate::off_time::dtos::*;
    pub use crate::schedule::dtos::*;
}

pub use crate::availability::api::*;
pub use crate::booking::api::*;
pub use crate::expert::api::*;
pub use crate::off_time::api::*;
pub use crate::schedule::api::*;
pub use crate::shared::*;
pub use crate::status::api::*;
