// tests/debug_routes_tests.rs
mod common;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

const GUEST: &str = "guest@hostel.test";

#[actix_rt::test]
async fn diagnostic_routes_are_absent_unless_enabled() {
  let h = harness();
  let app = test::init_service(test_app(&h.state, false)).await;

  for uri in ["/api/debug", "/api/debug-database", "/api/auth-debug", "/api/test-auth"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
  }

  let health: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(health["status"], "ok");
}

#[actix_rt::test]
async fn debug_reports_environment_and_cookie_presence() {
  let h = harness();
  let app = test::init_service(test_app(&h.state, true)).await;

  let body: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri("/api/debug")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;

  assert_eq!(body["environment"], "development");
  assert_eq!(body["database"]["connected"], true);
  assert_eq!(body["cookies"]["userEmail"], true);
  assert_eq!(body["cookies"]["userId"], false);
  assert_eq!(body["gateway"]["configured"], true);
  assert!(body["timestamp"].is_string());
}

#[actix_rt::test]
async fn database_probe_failure_is_reported_as_data() {
  let h = harness();
  h.store.fail_ping.store(true, Ordering::SeqCst);
  let app = test::init_service(test_app(&h.state, true)).await;

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/debug-database").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["database"]["connected"], false);
  assert!(body["database"]["error"].is_string());
}

#[actix_rt::test]
async fn database_overview_counts_rows_and_samples_rooms() {
  let h = harness();
  h.store.add_room("Mixed Dorm", 1, 8, 55_000);
  h.store.add_room("Family Room", 4, 0, 320_000);
  h.store.add_user(GUEST, "password-1");
  let app = test::init_service(test_app(&h.state, true)).await;

  let body: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/debug-database").to_request()).await;
  assert_eq!(body["success"], true);
  assert_eq!(body["counts"]["rooms"], 2);
  assert_eq!(body["counts"]["users"], 1);
  assert_eq!(body["counts"]["bookings"], 0);
  assert_eq!(body["rooms"].as_array().map(Vec::len), Some(2));
  assert_eq!(body["recentBookings"], json!([]));
}

#[actix_rt::test]
async fn auth_debug_shows_cookies_and_lookup_result() {
  let h = harness();
  h.store.add_user(GUEST, "password-1");
  let app = test::init_service(test_app(&h.state, true)).await;

  let anonymous: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/auth-debug").to_request()).await;
  assert_eq!(anonymous["hasSession"], false);
  assert_eq!(anonymous["userFound"], false);

  let signed_in: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri("/api/auth-debug")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert_eq!(signed_in["hasSession"], true);
  assert_eq!(signed_in["cookies"]["userEmail"], GUEST);
  assert_eq!(signed_in["userFound"], true);
}

#[actix_rt::test]
async fn auth_debug_cross_checks_user_id_cookie() {
  let h = harness();
  let guest = h.store.add_user(GUEST, "password-1");
  let other = h.store.add_user("other@hostel.test", "password-2");
  let app = test::init_service(test_app(&h.state, true)).await;

  let check = |user_id: String| {
    test::TestRequest::get()
      .uri("/api/auth-debug")
      .cookie(session_cookie(GUEST))
      .cookie(Cookie::new("userId", user_id))
      .to_request()
  };

  let matching: Value = test::call_and_read_body_json(&app, check(guest.id.to_string())).await;
  assert_eq!(matching["userIdMatchesEmail"], true);

  let swapped: Value = test::call_and_read_body_json(&app, check(other.id.to_string())).await;
  assert_eq!(swapped["userIdMatchesEmail"], false);

  let garbage: Value = test::call_and_read_body_json(&app, check("not-a-uuid".to_string())).await;
  assert_eq!(garbage["userIdMatchesEmail"], false);

  let without_id: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri("/api/auth-debug")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert!(without_id["userIdMatchesEmail"].is_null());
}

#[actix_rt::test]
async fn test_auth_requires_cookie_identity() {
  let h = harness();
  h.store.add_user(GUEST, "password-1");
  let app = test::init_service(test_app(&h.state, true)).await;

  let anonymous = test::call_service(&app, test::TestRequest::get().uri("/api/test-auth").to_request()).await;
  assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

  let body: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri("/api/test-auth")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert_eq!(body["authenticated"], true);
  assert_eq!(body["userExists"], true);
}

#[actix_rt::test]
async fn booking_test_round_trip_leaves_inventory_alone() {
  let h = harness();
  h.store.add_user(GUEST, "password-1");
  let room = h.store.add_room("Mixed Dorm", 1, 8, 55_000);
  let app = test::init_service(test_app(&h.state, true)).await;

  let created = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/booking-test")
      .cookie(session_cookie(GUEST))
      .set_json(json!({ "roomId": room.id, "nights": 2 }))
      .to_request(),
  )
  .await;
  assert_eq!(created.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(created).await;
  assert_eq!(created["booking"]["status"], "TEST");
  assert_eq!(created["booking"]["totalAmountCents"], 110_000);
  assert_eq!(h.store.available(room.id), 8);

  let booking_id = created["booking"]["id"].as_str().unwrap().to_string();
  let inspected: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri(&format!("/api/debug-booking?bookingId={}", booking_id))
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert_eq!(inspected["checks"]["roomExists"], true);
  assert_eq!(inspected["checks"]["userExists"], true);
  assert_eq!(inspected["checks"]["sessionMatchesBooking"], true);

  let listed: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get()
      .uri("/api/booking-test")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert_eq!(listed["count"], 1);

  let deleted: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::delete()
      .uri("/api/booking-test")
      .cookie(session_cookie(GUEST))
      .to_request(),
  )
  .await;
  assert_eq!(deleted["deleted"], 1);
  assert_eq!(h.store.booking_count(), 0);
}

#[actix_rt::test]
async fn debug_booking_validates_its_query() {
  let h = harness();
  let app = test::init_service(test_app(&h.state, true)).await;

  for uri in ["/api/debug-booking", "/api/debug-booking?bookingId=not-a-uuid"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
  }
}

#[actix_rt::test]
async fn demo_user_is_created_once() {
  let h = harness();
  let app = test::init_service(test_app(&h.state, true)).await;

  let first = test::call_service(
    &app,
    test::TestRequest::post().uri("/api/create-demo-user").to_request(),
  )
  .await;
  assert_eq!(first.status(), StatusCode::CREATED);
  let first: Value = test::read_body_json(first).await;
  assert_eq!(first["created"], true);
  assert_eq!(first["user"]["email"], "demo@hostel.test");

  let second: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::post().uri("/api/create-demo-user").to_request(),
  )
  .await;
  assert_eq!(second["created"], false);
  assert_eq!(second["user"]["id"], first["user"]["id"]);
}
