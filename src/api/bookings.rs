//! Availability and booking API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::booking::{Availability, AvailabilityQuery, BookingRecord, CreateBooking},
};

use super::AuthenticatedUser;

/// Remaining units per period, keyed by period number
#[utoipa::path(
    get,
    path = "/equipment/{id}/availability",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Remaining quantity per period", body = BTreeMap<String, i32>,
            example = json!({"1": 5, "2": 2, "3": 5, "4": 5, "5": 5, "6": 5, "7": 5})),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let availability = state
        .services
        .bookings
        .availability(id, &query.date, &query.shift)
        .await?;
    Ok(Json(availability))
}

/// List the bookings recorded for one equipment, date and shift
#[utoipa::path(
    get,
    path = "/equipment/{id}/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Bookings for the slot", body = Vec<BookingRecord>)
    )
)]
pub async fn list_slot_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<BookingRecord>>> {
    let bookings = state
        .services
        .bookings
        .slot_bookings(id, &query.date, &query.shift)
        .await?;
    Ok(Json(bookings))
}

/// Book equipment for one or more periods
#[utoipa::path(
    post,
    path = "/equipment/{id}/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking recorded", body = BookingRecord),
        (status = 400, description = "No period selected or not enough units left", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(data), _): WithRejection<Json<CreateBooking>, AppError>,
) -> AppResult<(StatusCode, Json<BookingRecord>)> {
    let booking = state.services.bookings.submit(&ctx, id, &data).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List the current user's bookings, newest first
#[utoipa::path(
    get,
    path = "/bookings/me",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own bookings", body = Vec<BookingRecord>)
    )
)]
pub async fn my_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<BookingRecord>>> {
    let bookings = state.services.bookings.my_bookings(&ctx).await?;
    Ok(Json(bookings))
}
