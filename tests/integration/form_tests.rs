//! Form page tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use crate::common::TestApp;

async fn setup() -> (TestApp, String, i64) {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/equipment",
            Some(&token),
            Some(json!({ "name": "Projector", "total": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("equipment id");
    (app, token, id)
}

fn page(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder.body(Body::empty()).expect("request")
}

fn form(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, format!("session={}", token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn test_dashboard_prompts_anonymous_sign_in() {
    let app = TestApp::new();
    let (status, body, _) = app.send(page("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("/login"));
}

#[tokio::test]
async fn test_booking_page_redirects_anonymous_users() {
    let (app, _, id) = setup().await;
    let (status, _, headers) = app
        .send(page(&format!("/agendar/{}?data=2024-05-01&turno=morning", id), None))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_booking_page_lists_remaining_per_period() {
    let (app, token, id) = setup().await;
    let (status, body, _) = app
        .send(page(&format!("/agendar/{}?data=2024-05-01&turno=morning", id), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Aula 1: 5"));
    assert!(text.contains("Aula 7: 5"));
}

#[tokio::test]
async fn test_form_submission_books_and_redirects() {
    let (app, token, id) = setup().await;
    let uri = format!("/agendar/{}", id);

    let (status, _, headers) = app
        .send(form(&uri, &token, "data=2024-05-01&turno=morning&aulas=1&aulas=2&quantidade=3"))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let (_, body, _) = app
        .send(page(&format!("{}?data=2024-05-01&turno=morning", uri), Some(&token)))
        .await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Aula 1: 2"));
    assert!(text.contains("Aula 2: 2"));
    assert!(text.contains("Aula 3: 5"));

    let (_, body, _) = app.send(page("/", Some(&token))).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Signed in as ana@school.org"));
    assert!(text.contains("aulas 1,2 x3"));
}

#[tokio::test]
async fn test_form_rejection_is_plain_text() {
    let (app, token, id) = setup().await;
    let uri = format!("/agendar/{}", id);

    let (status, _, _) = app
        .send(form(&uri, &token, "data=2024-05-01&turno=morning&aulas=1&aulas=2&quantidade=3"))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, body, _) = app
        .send(form(&uri, &token, "data=2024-05-01&turno=morning&aulas=2&aulas=3&quantidade=3"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        String::from_utf8_lossy(&body),
        "Period 2 has only 2 unit(s) available"
    );

    let (status, body, _) = app
        .send(form(&uri, &token, "data=2024-05-01&turno=morning&quantidade=1"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8_lossy(&body), "No period selected");
}

#[tokio::test]
async fn test_equipment_form_creates_then_lists() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;

    let (status, body, _) = app
        .send(form("/equipamentos", &token, "nome=Projector&quantidade=5"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("#1 Projector (total 5)"));

    let (status, _, _) = app.send(form("/equipamentos", &token, "nome=Tablet")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = app.send(page("/equipamentos", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Projector (total 5)"));
    assert!(text.contains("Tablet (total 1)"));

    let (status, body, _) = app.send(page("/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("Tablet (total 1)"));
}

#[tokio::test]
async fn test_equipment_form_rejects_negative_quantity() {
    let app = TestApp::new();
    let token = app.login("ana@school.org").await;

    let (status, body, _) = app
        .send(form("/equipamentos", &token, "nome=Projector&quantidade=-2"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("Total must not be negative"));

    let (_, body, _) = app.send(page("/equipamentos", Some(&token))).await;
    assert!(!String::from_utf8_lossy(&body).contains("Projector"));
}

#[tokio::test]
async fn test_equipment_form_requires_session_and_admin() {
    let mut config = equipment_booking_server::AppConfig::default();
    config.auth.admin_emails = vec!["admin@school.org".to_string()];
    let app = TestApp::with_config(config);

    let (status, _, headers) = app.send(page("/equipamentos", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login");

    let member = app.login("ana@school.org").await;
    let (status, _, _) = app
        .send(form("/equipamentos", &member, "nome=Projector&quantidade=5"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
