//! Integration tests for the booking, court, and user services.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::{harness, sign_in};
use court_booking::services::{
    BookingRequest, PasswordChangeRequest, UserUpdateRequest, CANCELLED,
};
use court_booking::ServiceError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn court_body(id: u32, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "courtType": "Singles",
        "surfaceType": "Clay",
        "pricePerHour": 30.0,
        "status": "AVAILABLE",
        "courtNumber": id
    })
}

fn booking_body(id: u32, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "courtId": 3,
        "userId": "u1",
        "startTime": "2030-06-01T10:00:00",
        "endTime": "2030-06-01T11:30:00",
        "status": status,
        "totalPrice": 45.0,
        "numberOfPlayers": 2
    })
}

// ============================================================================
// Courts
// ============================================================================

#[tokio::test]
async fn test_available_courts_sends_time_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courts/available"))
        .and(query_param("startTime", "2030-06-01T10:00:00"))
        .and(query_param("endTime", "2030-06-01T11:00:00"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([court_body(1, "Center"), court_body(2, "North")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let start = Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2030, 6, 1, 11, 0, 0).unwrap();
    let courts = h.app.courts().available_courts(&start, &end).await.unwrap();

    assert_eq!(courts.len(), 2);
    assert_eq!(courts[0].id, "1");
    assert!(courts[0].is_available());
}

#[tokio::test]
async fn test_court_availability_sends_date_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courts/3/availability"))
        .and(query_param("startDate", "2030-06-01"))
        .and(query_param("endDate", "2030-06-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courtId": 3,
            "availableSlots": [
                {"startTime": "2030-06-01T08:00:00", "endTime": "2030-06-01T09:00:00"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let availability = h
        .app
        .courts()
        .court_availability(
            "3",
            &NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            &NaiveDate::from_ymd_opt(2030, 6, 2).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(availability.court_id, "3");
    assert_eq!(availability.available_slots.len(), 1);
}

#[tokio::test]
async fn test_court_id_is_encoded_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courts/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(court_body(1, "Center")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let court = h.app.courts().get_court("a/b").await.unwrap();
    assert_eq!(court.name, "Center");
}

#[tokio::test]
async fn test_update_court_status_sends_status_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/courts/2/status"))
        .and(body_json(json!({"status": "MAINTENANCE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(court_body(2, "North")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    h.app
        .courts()
        .update_court_status("2", "MAINTENANCE")
        .await
        .unwrap();
}

// ============================================================================
// Bookings
// ============================================================================

#[tokio::test]
async fn test_create_booking_sends_api_datetimes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bookings"))
        .and(header("Authorization", "Bearer T1"))
        .and(body_json(json!({
            "courtId": "3",
            "startTime": "2030-06-01T10:00:00",
            "endTime": "2030-06-01T11:30:00",
            "numberOfPlayers": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(booking_body(11, "CONFIRMED")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let request = BookingRequest {
        court_id: "3".to_string(),
        start_time: Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2030, 6, 1, 11, 30, 0).unwrap(),
        number_of_players: 2,
        special_requests: None,
        recurring: None,
        recurrence_pattern: None,
        recurrence_end_date: None,
    };
    let booking = h.app.bookings().create_booking(&request).await.unwrap();

    assert_eq!(booking.id, "11");
    assert_eq!(booking.court_id, "3");
    assert!(booking.is_upcoming(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
}

#[tokio::test]
async fn test_cancel_booking_patches_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/bookings/11/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_body(11, CANCELLED)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let booking = h.app.bookings().cancel_booking("11").await.unwrap();
    assert_eq!(booking.status, CANCELLED);
}

#[tokio::test]
async fn test_calculate_booking_price_returns_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/calculate-price/3"))
        .and(query_param("startTime", "2030-06-01T10:00:00"))
        .and(query_param("endTime", "2030-06-01T11:30:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": 45.5})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let price = h
        .app
        .bookings()
        .calculate_booking_price(
            "3",
            &Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap(),
            &Utc.with_ymd_and_hms(2030, 6, 1, 11, 30, 0).unwrap(),
        )
        .await
        .unwrap();

    assert!((price - 45.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_check_court_availability_sends_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/check-availability/3"))
        .and(query_param("date", "2030-06-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"courtId": 3, "availableSlots": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let availability = h
        .app
        .bookings()
        .check_court_availability("3", &NaiveDate::from_ymd_opt(2030, 6, 1).unwrap())
        .await
        .unwrap();
    assert!(availability.available_slots.is_empty());
}

#[tokio::test]
async fn test_all_bookings_uses_default_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [booking_body(11, "CONFIRMED"), booking_body(12, "COMPLETED")],
            "totalElements": 22,
            "totalPages": 3,
            "number": 1,
            "size": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let page = h.app.bookings().all_bookings(1, None).await.unwrap();

    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_elements, 22);
    assert!(page.has_next());
}

#[tokio::test]
async fn test_upcoming_and_past_bookings_hit_separate_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/user/upcoming"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([booking_body(1, "CONFIRMED")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings/user/past"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    assert_eq!(h.app.bookings().user_upcoming_bookings().await.unwrap().len(), 1);
    assert!(h.app.bookings().user_past_bookings().await.unwrap().is_empty());
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_update_profile_requires_session() {
    let server = MockServer::start().await;

    let h = harness(&server);
    let update = UserUpdateRequest {
        phone: Some("5551234567".to_string()),
        ..Default::default()
    };
    let err = h.app.users().update_profile(&update).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotAuthenticated));
    assert_eq!(err.to_string(), "User not authenticated");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_profile_targets_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u1"))
        .and(body_json(json!({"phone": "5551234567"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "a@x.com",
            "firstName": "A",
            "lastName": "B",
            "phone": "5551234567",
            "roles": ["PLAYER"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let update = UserUpdateRequest {
        phone: Some("5551234567".to_string()),
        ..Default::default()
    };
    let user = h.app.users().update_profile(&update).await.unwrap();
    assert_eq!(user.phone.as_deref(), Some("5551234567"));
}

#[tokio::test]
async fn test_change_password_patches_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/users/u1/password"))
        .and(body_json(json!({"currentPassword": "old", "newPassword": "new"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    h.app
        .users()
        .change_password(&PasswordChangeRequest {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_all_users_sends_page_and_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "0"))
        .and(query_param("size", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "totalElements": 0,
            "totalPages": 0,
            "number": 0,
            "size": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let page = h.app.users().all_users(0, Some(25)).await.unwrap();
    assert!(page.content.is_empty());
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_service_error_exposes_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let h = harness(&server);
    sign_in(&h, "T1", Some("R1"));

    let err = h.app.users().current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Forbidden");
}
