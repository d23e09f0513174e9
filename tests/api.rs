mod helpers;

use actix_web::{http::StatusCode, test, App};
use chrono::NaiveDate;
use consultation_booking_api::configure_app;
use consultation_booking_api_structs::{
    create_booking, create_expert, create_off_time, create_schedule, update_booking_status,
};
use consultation_booking_domain::{Actor, ActorRole, BookingMode, ID};
use helpers::{actor, as_actor, call, id_of, setup, utc};
use serde_json::Value;

fn booking_body(expert_id: &ID, hour: u32, minute: u32) -> create_booking::RequestBody {
    create_booking::RequestBody {
        expert_id: expert_id.clone(),
        start_time: utc(2025, 6, 2, hour, minute),
        end_time: Some(utc(2025, 6, 2, hour, minute) + chrono::Duration::minutes(30)),
        duration_minutes: None,
        mode: BookingMode::Online,
        notes: None,
        location: None,
        meeting_link: None,
    }
}

fn status_body(status: &str) -> update_booking_status::RequestBody {
    update_booking_status::RequestBody {
        status: status.into(),
        note: None,
        reason: None,
        meeting_link: None,
    }
}

/// Creates an expert available Mondays 09:00 - 12:00 and returns it as an actor
macro_rules! seed_expert {
    ($app:expr) => {{
        let admin = actor(ActorRole::Admin);
        let req = as_actor(test::TestRequest::post().uri("/api/v1/experts"), &admin).set_json(
            create_expert::RequestBody {
                name: "Ada Lovelace".into(),
                email: format!("{}@example.com", ID::new()),
                expertise: "tax".into(),
            },
        );
        let (status, body) = call(&$app, req.to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
        let expert = Actor::new(id_of(&body), ActorRole::Expert);

        let req = as_actor(test::TestRequest::post().uri("/api/v1/schedules"), &expert).set_json(
            create_schedule::RequestBody {
                expert_id: expert.id.clone(),
                day_of_week: Some(1),
                days_of_week: None,
                start_time: "09:00".into(),
                end_time: "12:00".into(),
            },
        );
        let (status, _) = call(&$app, req.to_request()).await;
        assert_eq!(status, StatusCode::CREATED);
        expert
    }};
}

#[actix_web::test]
async fn health_check() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;

    let (status, body) = call(&app, test::TestRequest::get().uri("/api/v1/").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], Value::Bool(true));
}

#[actix_web::test]
async fn happy_path_booking() {
    let (ctx, _) = setup();
    let app =
        test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx.clone()))).await;
    let expert = seed_expert!(app);
    let user = actor(ActorRole::User);

    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .set_json(booking_body(&expert.id, 10, 0));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["type"], "online");
    assert_eq!(body["data"]["duration_minutes"], 30);
    assert_eq!(body["data"]["can_be_confirmed"], true);
    assert_eq!(body["data"]["can_be_cancelled"], true);
    assert_eq!(body["data"]["is_expired"], false);
    let booking_id = id_of(&body);

    let uri = format!("/api/v1/bookings/{}/history", booking_id);
    let req = as_actor(test::TestRequest::get().uri(&uri), &user);
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["from_status"], Value::Null);
    assert_eq!(history[0]["to_status"], "pending");
    assert_eq!(history[0]["actor_id"], user.id.to_string());

    let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    assert_eq!(ctx.cache.get(&expert.id, &monday).await, Some(true));
}

#[actix_web::test]
async fn double_booking_race() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);
    let first = actor(ActorRole::User);
    let second = actor(ActorRole::User);

    let req_a = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &first)
        .set_json(booking_body(&expert.id, 10, 0))
        .to_request();
    let req_b = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &second)
        .set_json(booking_body(&expert.id, 10, 0))
        .to_request();
    let ((status_a, body_a), (status_b, body_b)) =
        futures::join!(call(&app, req_a), call(&app, req_b));

    let mut statuses = vec![status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    let loser = if status_a == StatusCode::CONFLICT {
        body_a
    } else {
        body_b
    };
    assert_eq!(loser["success"], Value::Bool(false));
    let code = loser["error"].as_str().unwrap();
    assert!(code == "conflict" || code == "lock_busy", "{}", code);

    let uri = format!("/api/v1/experts/{}/bookings", expert.id);
    let (status, body) = call(&app, as_actor(test::TestRequest::get().uri(&uri), &expert).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[actix_web::test]
async fn outside_schedule_is_rejected() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);
    let user = actor(ActorRole::User);

    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .set_json(booking_body(&expert.id, 8, 0));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert!(body["message"].as_str().unwrap().contains("outside schedule"));

    let uri = format!("/api/v1/users/{}/bookings", user.id);
    let (_, body) = call(&app, as_actor(test::TestRequest::get().uri(&uri), &user).to_request()).await;
    assert_eq!(body["data"]["total"], 0);
}

#[actix_web::test]
async fn off_time_blocks_a_scheduled_window() {
    let (ctx, _) = setup();
    let app =
        test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx.clone()))).await;
    let expert = seed_expert!(app);

    let req = as_actor(test::TestRequest::post().uri("/api/v1/off-times"), &expert).set_json(
        create_off_time::RequestBody {
            expert_id: expert.id.clone(),
            start_date: "2025-06-02".into(),
            end_date: "2025-06-02".into(),
            reason: Some("Conference".into()),
        },
    );
    let (status, _) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::CREATED);

    let user = actor(ActorRole::User);
    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .set_json(booking_body(&expert.id, 10, 0));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    assert_eq!(ctx.cache.get(&expert.id, &monday).await, Some(false));
}

#[actix_web::test]
async fn cancellation_needs_lead_time() {
    let (ctx, sys) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);
    let user = actor(ActorRole::User);

    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .set_json(booking_body(&expert.id, 10, 0));
    let (_, body) = call(&app, req.to_request()).await;
    let uri = format!("/api/v1/bookings/{}", id_of(&body));

    sys.set(utc(2025, 6, 2, 9, 30));
    let req = as_actor(test::TestRequest::delete().uri(&uri), &user);
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    sys.set(utc(2025, 6, 2, 8, 30));
    let req = as_actor(test::TestRequest::delete().uri(&uri), &user);
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let req = as_actor(test::TestRequest::get().uri(&format!("{}/history", uri)), &user);
    let (_, body) = call(&app, req.to_request()).await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["from_status"], "pending");
    assert_eq!(history[1]["to_status"], "cancelled");
}

#[actix_web::test]
async fn only_experts_complete_bookings() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);
    let user = actor(ActorRole::User);

    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .set_json(booking_body(&expert.id, 10, 0));
    let (_, body) = call(&app, req.to_request()).await;
    let uri = format!("/api/v1/bookings/{}/status", id_of(&body));

    let req = as_actor(test::TestRequest::put().uri(&uri), &expert).set_json(status_body("confirmed"));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");

    let req = as_actor(test::TestRequest::put().uri(&uri), &user).set_json(status_body("completed"));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let req = as_actor(test::TestRequest::put().uri(&uri), &expert).set_json(status_body("completed"));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    // Completed is final
    let req = as_actor(test::TestRequest::put().uri(&uri), &expert).set_json(status_body("cancelled"));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[actix_web::test]
async fn identity_and_payload_errors() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .set_json(booking_body(&expert.id, 10, 0));
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let user = actor(ActorRole::User);
    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user)
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"expert_id\": 12}");
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let mut body = booking_body(&expert.id, 10, 0);
    body.end_time = None;
    body.duration_minutes = Some(i64::MAX);
    let req = as_actor(test::TestRequest::post().uri("/api/v1/bookings"), &user).set_json(body);
    let (status, body) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let uri = format!("/api/v1/bookings/{}/status", ID::new());
    let req = as_actor(test::TestRequest::put().uri(&uri), &user).set_json(status_body("done"));
    let (status, _) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Users can not manage experts
    let req = as_actor(test::TestRequest::delete().uri(&format!("/api/v1/experts/{}", expert.id)), &user);
    let (status, _) = call(&app, req.to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn availability_check_is_public() {
    let (ctx, _) = setup();
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, ctx))).await;
    let expert = seed_expert!(app);

    let check = |time: &str| {
        test::TestRequest::post()
            .uri("/api/v1/availability/check")
            .set_json(serde_json::json!({
                "expert_id": expert.id,
                "date": "2025-06-02",
                "time": time,
            }))
            .to_request()
    };
    let (status, body) = call(&app, check("09:00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], true);
    let (_, body) = call(&app, check("12:00")).await;
    assert_eq!(body["data"]["available"], false);
    let (status, _) = call(&app, check("25:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
