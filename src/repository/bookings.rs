//! Bookings repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookingLedger;
use crate::{
    error::AppResult,
    models::booking::{BookingRecord, BookingRow, NewBooking, SlotKey},
};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingLedger for BookingsRepository {
    async fn list_for_slot(&self, key: &SlotKey) -> AppResult<Vec<BookingRecord>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT * FROM bookings
            WHERE equipment_id = $1 AND date = $2 AND shift = $3
            ORDER BY id
            "#,
        )
        .bind(key.equipment_id)
        .bind(&key.date)
        .bind(&key.shift)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRecord::try_from).collect()
    }

    async fn list_for_requester(&self, requester: &str) -> AppResult<Vec<BookingRecord>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE requester = $1 ORDER BY created_at DESC, id DESC"
        )
        .bind(requester)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRecord::try_from).collect()
    }

    async fn insert(&self, booking: &NewBooking) -> AppResult<BookingRecord> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (requester, equipment_id, date, shift, periods, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&booking.requester)
        .bind(booking.key.equipment_id)
        .bind(&booking.key.date)
        .bind(&booking.key.shift)
        .bind(booking.periods.to_db())
        .bind(booking.quantity)
        .fetch_one(&self.pool)
        .await?;

        BookingRecord::try_from(row)
    }
}
