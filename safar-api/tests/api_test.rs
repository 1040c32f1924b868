use std::sync::Arc;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use safar_api::{app, AppState};
use safar_store::app_config::{AuthConfig, ServerConfig, UploadConfig};
use safar_store::{DocumentStore, MemoryStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "safar-test-boundary";

struct TestApp {
    router: Router,
    uploads: TempDir,
}

fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let upload_config = UploadConfig {
        dir: uploads.path().to_path_buf(),
        max_bytes: 1024 * 1024,
    };
    let server = ServerConfig {
        port: 0,
        allowed_origins: vec!["http://localhost".to_string()],
    };
    let state = AppState::in_memory(
        Arc::new(MemoryStore::new()),
        DocumentStore::new(uploads.path()),
        AuthConfig { dashboard_password: "s3cret".to_string() },
    );

    TestApp {
        router: app(state, &server, &upload_config),
        uploads,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn create_trip(&self, state: &str) -> i64 {
        let (status, body) = self.call(Method::POST, "/api/trips", Some(trip_body(state))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).unwrap().count()
    }
}

fn trip_body(state: &str) -> Value {
    json!({
        "date": "2025-05-10",
        "airline": "Saudia",
        "hotel": "Hilton Makkah",
        "hotel_distance": "150m",
        "route": "ALG-JED",
        "duration": 15,
        "type": "umrah",
        "state": state,
        "room5_price": 100,
        "room4_price": 120,
        "room3_price": 150,
        "room2_price": 200
    })
}

fn booking_body(trip_id: i64, room_type: &str) -> Value {
    json!({
        "tripId": trip_id,
        "firstName": "Amina",
        "lastName": "Haddad",
        "email": "amina@example.com",
        "phone": "0550000000",
        "birthDate": "1990-02-02",
        "birthPlace": "Oran",
        "passportNumber": "P1234567",
        "passportIssueDate": "2020-01-01",
        "passportExpiryDate": "2030-01-01",
        "maritalStatus": "married",
        "familyMembers": "3",
        "occupation": "engineer",
        "umrahType": "economy",
        "roomType": room_type
    })
}

fn multipart_request(fields: &[(&str, String)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"passportFile\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/bookings")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form_fields(trip_id: i64, room_type: &str) -> Vec<(&'static str, String)> {
    let json = booking_body(trip_id, room_type);
    let mut fields = Vec::new();
    for key in [
        "firstName", "lastName", "email", "phone", "birthDate", "birthPlace", "passportNumber",
        "passportIssueDate", "passportExpiryDate", "maritalStatus", "familyMembers", "occupation",
        "umrahType", "roomType",
    ] {
        fields.push((key, json[key].as_str().unwrap().to_string()));
    }
    fields.push(("tripId", trip_id.to_string()));
    fields
}

#[tokio::test]
async fn test_new_trip_has_available_rooms() {
    let app = test_app();
    let id = app.create_trip("Oran").await;

    let (status, trip) = app.call(Method::GET, &format!("/api/trips/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip["type"], "umrah");
    for tier in ["room5", "room4", "room3", "room2"] {
        assert_eq!(trip[tier]["status"], "available");
    }
    assert_eq!(trip["room2"]["price"], 200);
}

#[tokio::test]
async fn test_create_trip_reports_missing_field() {
    let app = test_app();
    let mut body = trip_body("all");
    body.as_object_mut().unwrap().remove("hotel");

    let (status, error) = app.call(Method::POST, "/api/trips", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Missing required field: hotel");

    let (status, error) = app
        .call(Method::POST, "/api/trips", Some(json!({ "duration": "abc" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn test_full_room_rejects_booking() {
    let app = test_app();
    let id = app.create_trip("all").await;

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/trips/{id}/status"),
            Some(json!({
                "room5_status": "full",
                "room4_status": "available",
                "room3_status": "available",
                "room2_status": "available"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, error) = app.call(Method::POST, "/api/bookings", Some(booking_body(id, "5"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "This room type is fully booked");

    let (_, listing) = app.call(Method::GET, "/api/bookings", None).await;
    assert_eq!(listing["bookings"].as_array().unwrap().len(), 0);

    let (status, _) = app.call(Method::POST, "/api/bookings", Some(booking_body(id, "4"))).await;
    assert_eq!(status, StatusCode::CREATED);

    // Status updates never move prices.
    let (_, trip) = app.call(Method::GET, &format!("/api/trips/{id}"), None).await;
    assert_eq!(trip["room5"]["price"], 100);
}

#[tokio::test]
async fn test_booking_listing_and_status_update() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;

    let (status, created) = app
        .call(Method::POST, "/api/bookings", Some(booking_body(trip_id, "3")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app
        .call(Method::PUT, &format!("/api/bookings/{id}"), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = app.call(Method::GET, "/api/bookings?branch=Oran", None).await;
    let bookings = listing["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["status"], "approved");
    assert_eq!(bookings[0]["branch"], "Oran");
    assert_eq!(bookings[0]["trip"]["airline"], "Saudia");

    let (_, listing) = app.call(Method::GET, "/api/bookings?branch=Alger", None).await;
    assert!(listing["bookings"].as_array().unwrap().is_empty());

    let (_, stats) = app.call(Method::GET, "/api/stats", None).await;
    assert_eq!(stats["total_bookings"], 1);
    assert_eq!(stats["approved_bookings"], 1);
    assert_eq!(stats["pending_bookings"], 0);
    assert_eq!(stats["total_trips"], 1);
    assert_eq!(stats["state_stats"]["Oran"], 1);
    assert_eq!(stats["type_stats"]["economy"], 1);

    let (status, _) = app
        .call(Method::PUT, "/api/bookings/999", Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trip_trash_round_trip() {
    let app = test_app();
    let id = app.create_trip("Oran").await;
    let (_, before) = app.call(Method::GET, &format!("/api/trips/{id}"), None).await;

    let (status, _) = app.call(Method::DELETE, &format!("/api/trips/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, &format!("/api/trips/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, trash) = app.call(Method::GET, "/api/trash/trips", None).await;
    let entries = trash["trips"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["original_id"], id);
    assert!(entries[0]["deleted_at"].is_string());

    let (status, _) = app
        .call(Method::POST, &format!("/api/trash/trips/{id}/restore"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = app.call(Method::GET, &format!("/api/trips/{id}"), None).await;
    assert_eq!(before, after);
    let (_, trash) = app.call(Method::GET, "/api/trash/trips", None).await;
    assert!(trash["trips"].as_array().unwrap().is_empty());
    let (_, trips) = app.call(Method::GET, "/api/trips?state=Oran", None).await;
    assert_eq!(trips["trips"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_trip_with_bookings_cannot_be_deleted() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;
    let (_, created) = app
        .call(Method::POST, "/api/bookings", Some(booking_body(trip_id, "2")))
        .await;
    let booking_id = created["id"].as_i64().unwrap();

    let (status, error) = app.call(Method::DELETE, &format!("/api/trips/{trip_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Cannot delete trip with existing bookings");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/bookings/{booking_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::DELETE, &format!("/api/trips/{trip_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::POST, &format!("/api/bookings/{booking_id}/restore"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::POST, &format!("/api/trash/trips/{trip_id}/restore"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::POST, &format!("/api/bookings/{booking_id}/restore"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_purge_is_irreversible() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;

    let (status, _) = app.call(Method::DELETE, &format!("/api/trips/{trip_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/trash/trips/{trip_id}/permanent"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, trash) = app.call(Method::GET, "/api/trash/trips", None).await;
    assert!(trash["trips"].as_array().unwrap().is_empty());
    let (status, _) = app
        .call(Method::POST, &format!("/api/trash/trips/{trip_id}/restore"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/trash/trips/{trip_id}/permanent"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_multipart_booking_stores_document() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;

    let request = multipart_request(&form_fields(trip_id, "4"), Some(("passport.PDF", &b"%PDF-1.4"[..])));
    let (status, created) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(app.stored_files(), 1);

    let id = created["id"].as_i64().unwrap();
    let (_, booking) = app.call(Method::GET, &format!("/api/bookings/{id}"), None).await;
    let reference = booking["passportFile"].as_str().unwrap().to_string();
    assert!(reference.starts_with("uploads/") && reference.ends_with(".pdf"));

    let (status, _) = app.call(Method::GET, &format!("/{reference}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/bookings/{id}/permanent"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_multipart_rejections_leave_no_file() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;

    let request = multipart_request(&form_fields(trip_id, "4"), Some(("passport.exe", &b"MZ"[..])));
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = multipart_request(&form_fields(9999, "4"), Some(("passport.png", &b"png"[..])));
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.stored_files(), 0);
    let (_, listing) = app.call(Method::GET, "/api/bookings", None).await;
    assert!(listing["bookings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_password() {
    let app = test_app();

    let (status, body) = app
        .call(Method::POST, "/api/check-password", Some(json!({ "password": "s3cret" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app
        .call(Method::POST, "/api/check-password", Some(json!({ "password": "nope" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.call(Method::POST, "/api/check-password", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = test_app();
    let (status, body) = app.call(Method::GET, "/api/trips/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_cors_allows_configured_host_only() {
    let app = test_app();
    let origin_header = |origin: &str| {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/trips")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let router = app.router.clone();
        async move {
            let response = router.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .map(|v| v.to_str().unwrap().to_string())
        }
    };

    assert_eq!(
        origin_header("http://localhost:5173").await.as_deref(),
        Some("http://localhost:5173")
    );
    assert_eq!(origin_header("http://localhost.evil.example").await, None);
    assert_eq!(origin_header("http://localhost:80@evil.example").await, None);
}

#[tokio::test]
async fn test_numeric_json_booking_fields_are_accepted() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;

    let mut body = booking_body(trip_id, "5");
    body["roomType"] = json!(5);
    body["familyMembers"] = json!(3);
    body["phone"] = json!(550123456);

    let (status, created) = app.call(Method::POST, "/api/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let (_, listing) = app.call(Method::GET, "/api/bookings", None).await;
    let booking = &listing["bookings"][0];
    assert_eq!(booking["roomType"], "5");
    assert_eq!(booking["phone"], "550123456");
}

#[tokio::test]
async fn test_trip_purge_clears_trashed_booking_reference() {
    let app = test_app();
    let trip_id = app.create_trip("all").await;
    let (_, created) = app
        .call(Method::POST, "/api/bookings", Some(booking_body(trip_id, "4")))
        .await;
    let booking_id = created["id"].as_i64().unwrap();

    app.call(Method::DELETE, &format!("/api/bookings/{booking_id}"), None).await;
    let (_, trash) = app.call(Method::GET, "/api/trash/bookings", None).await;
    assert_eq!(trash["bookings"][0]["tripId"], trip_id);

    let (status, _) = app.call(Method::DELETE, &format!("/api/trips/{trip_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/trash/trips/{trip_id}/permanent"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, trash) = app.call(Method::GET, "/api/trash/bookings", None).await;
    assert_eq!(trash["bookings"][0]["originalId"], booking_id);
    assert_eq!(trash["bookings"][0]["tripId"], Value::Null);
}
