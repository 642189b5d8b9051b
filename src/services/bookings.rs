//! Availability and booking service
//!
//! Remaining capacity is never stored: it is recomputed from the ledger on
//! every call, so raising an equipment total takes effect immediately and
//! lowering it below existing reservations only clamps availability at zero.
//!
//! Submissions for the same slot key (equipment, date, shift) are serialized
//! through a per-key async mutex held across read, validation and insert.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use validator::Validate;

use crate::{
    config::BookingConfig,
    error::{AppError, AppResult},
    models::{
        booking::{Availability, BookingRecord, CreateBooking, NewBooking, PeriodSet, SlotKey},
        user::RequestContext,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    config: BookingConfig,
    slot_locks: Arc<DashMap<SlotKey, Arc<Mutex<()>>>>,
}

impl BookingsService {
    pub fn new(repository: Repository, config: BookingConfig) -> Self {
        Self {
            repository,
            config,
            slot_locks: Arc::new(DashMap::new()),
        }
    }

    /// Remaining units per period for one equipment, date and shift
    pub async fn availability(&self, equipment_id: i32, date: &str, shift: &str) -> AppResult<Availability> {
        self.check_keys(date, shift)?;
        let key = SlotKey::new(equipment_id, date, shift);
        self.compute(&key).await
    }

    /// Bookings recorded for one equipment, date and shift
    pub async fn slot_bookings(&self, equipment_id: i32, date: &str, shift: &str) -> AppResult<Vec<BookingRecord>> {
        self.check_keys(date, shift)?;
        self.repository.equipment.get_by_id(equipment_id).await?;
        self.repository
            .bookings
            .list_for_slot(&SlotKey::new(equipment_id, date, shift))
            .await
    }

    /// Bookings made by the current user, newest first
    pub async fn my_bookings(&self, ctx: &RequestContext) -> AppResult<Vec<BookingRecord>> {
        self.repository.bookings.list_for_requester(&ctx.email).await
    }

    /// Validate and record a booking for the current user
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        equipment_id: i32,
        data: &CreateBooking,
    ) -> AppResult<BookingRecord> {
        let periods = PeriodSet::parse(&data.periods)?;
        if periods.is_empty() {
            return Err(AppError::EmptySelection);
        }
        data.validate()?;
        if ctx.email.is_empty() {
            return Err(AppError::Authentication("Missing requester identity".to_string()));
        }
        self.check_keys(&data.date, &data.shift)?;

        let key = SlotKey::new(equipment_id, data.date.as_str(), data.shift.as_str());
        let _lease = self.lock_slot(&key).await;
        self.validate_and_insert(ctx, key, periods, data.quantity).await
    }

    async fn validate_and_insert(
        &self,
        ctx: &RequestContext,
        key: SlotKey,
        periods: PeriodSet,
        quantity: i32,
    ) -> AppResult<BookingRecord> {
        let availability = self.compute(&key).await?;

        if let Some((period, remaining)) = availability.first_shortfall(&periods, quantity) {
            tracing::warn!(
                equipment_id = key.equipment_id,
                date = %key.date,
                shift = %key.shift,
                %period,
                remaining,
                quantity,
                "Booking rejected: insufficient capacity"
            );
            return Err(AppError::InsufficientCapacity { period, remaining });
        }

        let booking = self
            .repository
            .bookings
            .insert(&NewBooking {
                requester: ctx.email.clone(),
                key,
                periods,
                quantity,
            })
            .await?;

        tracing::info!(
            booking_id = booking.id,
            equipment_id = booking.equipment_id,
            date = %booking.date,
            shift = %booking.shift,
            quantity = booking.quantity,
            requester = %booking.requester,
            "Booking recorded"
        );
        Ok(booking)
    }

    async fn compute(&self, key: &SlotKey) -> AppResult<Availability> {
        let equipment = self.repository.equipment.get_by_id(key.equipment_id).await?;
        let bookings = self.repository.bookings.list_for_slot(key).await?;
        Ok(Availability::from_bookings(equipment.total, &bookings))
    }

    /// Reject malformed dates and unknown shifts when strict keys are enabled
    fn check_keys(&self, date: &str, shift: &str) -> AppResult<()> {
        if !self.config.strict_keys {
            return Ok(());
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid date '{}' (use YYYY-MM-DD)", date)))?;
        if !self.config.shifts.iter().any(|s| s == shift) {
            return Err(AppError::Validation(format!(
                "Unknown shift '{}' (expected one of: {})",
                shift,
                self.config.shifts.join(", ")
            )));
        }
        Ok(())
    }

    /// Wait for exclusive access to a slot key
    async fn lock_slot(&self, key: &SlotKey) -> SlotLease<'_> {
        let mut lease = SlotLease {
            locks: &self.slot_locks,
            key: key.clone(),
            guard: None,
        };
        let lock = self.slot_locks.entry(key.clone()).or_default().clone();
        lease.guard = Some(lock.lock_owned().await);
        lease
    }
}

/// Exclusive access to one slot key. The map entry is removed with the last
/// lease, also when the submitting future is dropped while waiting.
struct SlotLease<'a> {
    locks: &'a DashMap<SlotKey, Arc<Mutex<()>>>,
    key: SlotKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SlotLease<'_> {
    fn drop(&mut self) {
        // Give back this lease's reference before counting the others
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
