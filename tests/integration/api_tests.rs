//! JSON API tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

async fn create_projector(app: &TestApp, token: &str, total: i32) -> i64 {
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/equipment",
            Some(token),
            Some(json!({ "name": "Projector", "total": total })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("equipment id")
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.json(Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/api/v1/equipment", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = app
        .json(Method::GET, "/api/v1/equipment", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_session_identity() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let (status, body) = app.json(Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@school.org");
}

#[tokio::test]
async fn test_equipment_create_list_update() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let id = create_projector(&app, &token, 5).await;

    let (status, body) = app.json(Method::GET, "/api/v1/equipment", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/equipment/{}", id),
            Some(&token),
            Some(json!({ "total": 8 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["name"], "Projector");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/equipment",
            Some(&token),
            Some(json!({ "name": "Broken", "total": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.json(Method::GET, "/api/v1/equipment/42", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_list_restricts_equipment_creation() {
    let mut config = equipment_booking_server::AppConfig::default();
    config.auth.admin_emails = vec!["admin@school.org".to_string()];
    let app = TestApp::with_config(config);

    let member = app.login("ana@school.org").await;
    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/equipment",
            Some(&member),
            Some(json!({ "name": "Projector", "total": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.login("admin@school.org").await;
    create_projector(&app, &admin, 5).await;
}

#[tokio::test]
async fn test_projector_scenario() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let id = create_projector(&app, &token, 5).await;
    let bookings_uri = format!("/api/v1/equipment/{}/bookings", id);

    let (status, body) = app
        .json(
            Method::POST,
            &bookings_uri,
            Some(&token),
            Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [1, 2], "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["periods"], json!([1, 2]));
    assert_eq!(body["requester"], "ana@school.org");

    let (status, body) = app
        .json(
            Method::POST,
            &bookings_uri,
            Some(&token),
            Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [2, 3], "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InsufficientCapacity");
    assert_eq!(body["message"], "Period 2 has only 2 unit(s) available");

    let (status, body) = app
        .json(
            Method::GET,
            &format!("{}?date=2024-05-01&shift=morning", bookings_uri),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_availability_is_keyed_by_period_number() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let id = create_projector(&app, &token, 5).await;

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/v1/equipment/{}/bookings", id),
            Some(&token),
            Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [2, 3], "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .json(
            Method::GET,
            &format!("/api/v1/equipment/{}/availability?date=2024-05-01&shift=morning", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "1": 5, "2": 3, "3": 3, "4": 5, "5": 5, "6": 5, "7": 5 })
    );

    let (_, body) = app
        .json(
            Method::GET,
            &format!("/api/v1/equipment/{}/availability?date=2024-05-01&shift=evening", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["2"], 5);
}

#[tokio::test]
async fn test_empty_selection_and_unknown_equipment() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let id = create_projector(&app, &token, 5).await;

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/v1/equipment/{}/bookings", id),
            Some(&token),
            Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [], "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EmptySelection");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/equipment/99/bookings",
            Some(&token),
            Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [1], "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            Method::GET,
            "/api/v1/equipment/99/availability?date=2024-05-01&shift=morning",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_booking_bodies_are_bad_values() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let id = create_projector(&app, &token, 5).await;
    let uri = format!("/api/v1/equipment/{}/bookings", id);

    let bodies = [
        json!({ "date": "2024-05-01", "shift": "morning", "periods": [300], "quantity": 1 }),
        json!({ "date": "2024-05-01", "shift": "morning", "periods": [-1], "quantity": 1 }),
        json!({ "date": "2024-05-01", "shift": "morning", "periods": [8], "quantity": 1 }),
        json!({ "date": "2024-05-01", "shift": "morning", "periods": [1] }),
        json!({ "date": "2024-05-01", "shift": "morning", "periods": [1], "quantity": "two" }),
    ];
    for body in bodies {
        let (status, response) = app.json(Method::POST, &uri, Some(&token), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response["error"], "BadValue", "body {}", body);
    }

    let (_, availability) = app
        .json(
            Method::GET,
            &format!("/api/v1/equipment/{}/availability?date=2024-05-01&shift=morning", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(availability["1"], 5);
}

#[tokio::test]
async fn test_my_bookings_only_lists_own() {
    let app = TestApp::new();
    let ana = app.login("ana@school.org").await;
    let bruno = app.login("bruno@school.org").await;
    let id = create_projector(&app, &ana, 5).await;
    let uri = format!("/api/v1/equipment/{}/bookings", id);

    for (token, period) in [(&ana, 1), (&bruno, 2), (&ana, 3)] {
        let (status, _) = app
            .json(
                Method::POST,
                &uri,
                Some(token),
                Some(json!({ "date": "2024-05-01", "shift": "morning", "periods": [period], "quantity": 1 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.json(Method::GET, "/api/v1/bookings/me", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    let periods: Vec<_> = body
        .as_array()
        .expect("bookings")
        .iter()
        .map(|b| b["periods"].clone())
        .collect();
    assert_eq!(periods, vec![json!([3]), json!([1])]);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/equipment/{id}/bookings"].is_object());
}
