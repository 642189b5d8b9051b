//! Browser-facing booking pages
//!
//! Plain-text rendering of the dashboard, the equipment list and the
//! availability table, plus the urlencoded equipment and booking forms.
//! Errors are returned as `text/plain` with the same status codes as the
//! JSON API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{
        booking::{BookingRecord, CreateBooking},
        equipment::{CreateEquipment, Equipment},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Error rendered as a human-readable plain-text body
pub struct PlainError(AppError);

impl From<AppError> for PlainError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        let (status, _, message) = self.0.classify();
        (status, message).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingPageQuery {
    pub data: Option<String>,
    pub turno: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

/// Fields of the equipment form
#[derive(Debug, Deserialize)]
pub struct EquipmentForm {
    pub nome: String,
    #[serde(default = "default_quantity")]
    pub quantidade: i32,
}

impl From<EquipmentForm> for CreateEquipment {
    fn from(form: EquipmentForm) -> Self {
        CreateEquipment {
            name: form.nome.trim().to_string(),
            total: form.quantidade,
        }
    }
}

/// Fields of the booking form; `aulas` repeats once per checked period
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    pub data: String,
    pub turno: String,
    #[serde(default)]
    pub aulas: Vec<i64>,
    #[serde(default = "default_quantity")]
    pub quantidade: i32,
}

impl From<BookingForm> for CreateBooking {
    fn from(form: BookingForm) -> Self {
        CreateBooking {
            date: form.data,
            shift: form.turno,
            periods: form.aulas,
            quantity: form.quantidade,
        }
    }
}

fn equipment_line(item: &Equipment) -> String {
    format!("  #{} {} (total {}) -> /agendar/{}\n", item.id, item.name, item.total, item.id)
}

fn booking_line(booking: &BookingRecord) -> String {
    let periods: Vec<String> = booking.periods.iter().map(|p| p.to_string()).collect();
    format!(
        "  #{} equipment {} on {} / {}: aulas {} x{}\n",
        booking.id,
        booking.equipment_id,
        booking.date,
        booking.shift,
        periods.join(","),
        booking.quantity
    )
}

/// Equipment list and the user's bookings
pub async fn dashboard(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<Response, PlainError> {
    let Some(AuthenticatedUser(ctx)) = user else {
        return Ok((StatusCode::OK, "Equipment booking\n\nSign in at /login\n").into_response());
    };

    let equipment = state.services.equipment.list().await?;
    let bookings = state.services.bookings.my_bookings(&ctx).await?;

    let mut body = format!("Signed in as {}\n\nEquipment\n", ctx.email);
    body.extend(equipment.iter().map(equipment_line));
    body.push_str("\nMy bookings\n");
    body.extend(bookings.iter().map(booking_line));
    Ok((StatusCode::OK, body).into_response())
}

async fn equipment_page(state: &AppState) -> Result<Response, PlainError> {
    let equipment = state.services.equipment.list().await?;
    let mut body = String::from("Equipment\n");
    body.extend(equipment.iter().map(equipment_line));
    body.push_str("\nAdd equipment: POST /equipamentos with nome and quantidade\n");
    Ok((StatusCode::OK, body).into_response())
}

/// Equipment list with the add form
pub async fn list_equipment_page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<Response, PlainError> {
    if user.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }
    equipment_page(&state).await
}

/// Add equipment from the form, then show the updated list
pub async fn submit_equipment_form(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Form(form): Form<EquipmentForm>,
) -> Result<Response, PlainError> {
    let Some(AuthenticatedUser(ctx)) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    state.services.auth.require_admin(&ctx)?;
    state
        .services
        .equipment
        .create(&CreateEquipment::from(form))
        .await?;
    equipment_page(&state).await
}

/// Availability table for one equipment, date and shift
pub async fn booking_page(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(id): Path<i32>,
    Query(query): Query<BookingPageQuery>,
) -> Result<Response, PlainError> {
    if user.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let equipment = state.services.equipment.get_by_id(id).await?;
    let (Some(date), Some(shift)) = (query.data, query.turno) else {
        let body = format!(
            "{} (total {})\n\nChoose a date and shift: /agendar/{}?data=YYYY-MM-DD&turno=morning\n",
            equipment.name, equipment.total, id
        );
        return Ok((StatusCode::OK, body).into_response());
    };

    let availability = state.services.bookings.availability(id, &date, &shift).await?;
    let mut body = format!("{} - {} / {}\n", equipment.name, date, shift);
    body.extend(
        availability
            .iter()
            .map(|(period, remaining)| format!("Aula {}: {}\n", period, remaining)),
    );
    Ok((StatusCode::OK, body).into_response())
}

/// Submit the booking form; success returns to the dashboard
pub async fn submit_booking_form(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(id): Path<i32>,
    Form(form): Form<BookingForm>,
) -> Result<Response, PlainError> {
    let Some(AuthenticatedUser(ctx)) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    state
        .services
        .bookings
        .submit(&ctx, id, &CreateBooking::from(form))
        .await?;
    Ok(Redirect::to("/").into_response())
}
