//! HTTP handlers and router for the booking server

pub mod auth;
pub mod bookings;
pub mod equipment;
pub mod forms;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::RequestContext, AppState};

/// Cookie carrying the session JWT
pub const SESSION_COOKIE: &str = "session";
/// Cookie carrying the pending OAuth `state` value
pub const STATE_COOKIE: &str = "oauth_state";

/// Extractor for the authenticated user, from a Bearer token or the session cookie
pub struct AuthenticatedUser(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = bearer
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(SESSION_COOKIE)
                    .map(|cookie| cookie.value().to_string())
            })
            .ok_or_else(|| AppError::Authentication("Missing session token".to_string()))?;

        let ctx = state.services.auth.verify_token(&token)?;
        Ok(AuthenticatedUser(ctx))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Session
        .route("/auth/me", get(auth::me))
        // Equipment
        .route("/equipment", get(equipment::list_equipment))
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/:id", get(equipment::get_equipment))
        .route("/equipment/:id", put(equipment::update_equipment))
        // Availability & bookings
        .route("/equipment/:id/availability", get(bookings::get_availability))
        .route("/equipment/:id/bookings", get(bookings::list_slot_bookings))
        .route("/equipment/:id/bookings", post(bookings::create_booking))
        .route("/bookings/me", get(bookings::my_bookings))
        .with_state(state.clone());

    // Browser-facing routes
    let pages = Router::new()
        .route("/", get(forms::dashboard))
        .route("/dashboard", get(forms::dashboard))
        .route("/equipamentos", get(forms::list_equipment_page))
        .route("/equipamentos", post(forms::submit_equipment_form))
        .route("/login", get(auth::login))
        .route("/login/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/agendar/:id", get(forms::booking_page))
        .route("/agendar/:id", post(forms::submit_booking_form))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(pages)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
