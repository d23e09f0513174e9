use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test::{self, TestRequest},
};
use chrono::{DateTime, TimeZone, Utc};
use consultation_booking_api::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use consultation_booking_domain::{Actor, ActorRole, ID};
use consultation_booking_infra::{BookingContext, StaticTimeSys};
use serde_json::Value;
use std::sync::Arc;

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

/// Inmemory context in the UTC region with the clock frozen at
/// Sunday 2025-06-01 00:00
pub fn setup() -> (BookingContext, Arc<StaticTimeSys>) {
    let sys = Arc::new(StaticTimeSys::new(utc(2025, 6, 1, 0, 0)));
    let mut ctx = BookingContext::create_inmemory_with_sys(sys.clone());
    ctx.config.timezone = chrono_tz::UTC;
    (ctx, sys)
}

pub fn actor(role: ActorRole) -> Actor {
    Actor::new(ID::new(), role)
}

pub fn as_actor(req: TestRequest, actor: &Actor) -> TestRequest {
    req.insert_header((ACTOR_ID_HEADER, actor.id.to_string()))
        .insert_header((ACTOR_ROLE_HEADER, actor.role.as_str()))
}

/// Sends the request and returns the status together with the JSON body
pub async fn call<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn id_of(body: &Value) -> ID {
    body["data"]["id"]
        .as_str()
        .expect("Response to carry an id")
        .parse()
        .expect("Id to be valid")
}
