//! Booking models (periods, slot keys, booking records, availability)

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// First class period ("aula") of a shift
pub const FIRST_PERIOD: u8 = 1;
/// Last class period of a shift
pub const LAST_PERIOD: u8 = 7;

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// A class period within a shift, always in `FIRST_PERIOD..=LAST_PERIOD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

impl Period {
    pub fn new(value: u8) -> Option<Self> {
        (FIRST_PERIOD..=LAST_PERIOD)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every period of a shift, in ascending order
    pub fn all() -> impl Iterator<Item = Period> {
        (FIRST_PERIOD..=LAST_PERIOD).map(Period)
    }
}

impl TryFrom<u8> for Period {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Period::new(value).ok_or_else(|| {
            format!(
                "Invalid period {} (expected {}-{})",
                value, FIRST_PERIOD, LAST_PERIOD
            )
        })
    }
}

impl From<Period> for u8 {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PeriodSet
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free set of periods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodSet(BTreeSet<Period>);

impl PeriodSet {
    /// Parse raw period numbers, rejecting anything outside the period range
    pub fn parse(values: &[i64]) -> AppResult<Self> {
        values
            .iter()
            .map(|&v| {
                u8::try_from(v).ok().and_then(Period::new).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Invalid period {} (expected {}-{})",
                        v, FIRST_PERIOD, LAST_PERIOD
                    ))
                })
            })
            .collect::<AppResult<BTreeSet<_>>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Periods in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Period> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn to_db(&self) -> Vec<i16> {
        self.iter().map(|p| i16::from(p.get())).collect()
    }

    pub(crate) fn from_db(values: &[i16]) -> AppResult<Self> {
        values
            .iter()
            .map(|&v| {
                u8::try_from(v)
                    .ok()
                    .and_then(Period::new)
                    .ok_or_else(|| AppError::Internal(format!("Stored period {} out of range", v)))
            })
            .collect::<AppResult<BTreeSet<_>>>()
            .map(Self)
    }
}

impl FromIterator<Period> for PeriodSet {
    fn from_iter<I: IntoIterator<Item = Period>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// SlotKey
// ---------------------------------------------------------------------------

/// Unit of availability accounting: one equipment on one date and shift.
///
/// Date and shift are opaque labels compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub equipment_id: i32,
    pub date: String,
    pub shift: String,
}

impl SlotKey {
    pub fn new(equipment_id: i32, date: impl Into<String>, shift: impl Into<String>) -> Self {
        Self {
            equipment_id,
            date: date.into(),
            shift: shift.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// BookingRecord
// ---------------------------------------------------------------------------

/// A persisted reservation, immutable once created
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingRecord {
    pub id: i32,
    /// Email of the user who made the booking
    pub requester: String,
    pub equipment_id: i32,
    pub date: String,
    pub shift: String,
    /// Reserved periods, ascending
    #[schema(value_type = Vec<u8>)]
    pub periods: PeriodSet,
    /// Units reserved for each of the periods
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.equipment_id, self.date.clone(), self.shift.clone())
    }
}

/// Raw booking row as stored in PostgreSQL
#[derive(Debug, FromRow)]
pub(crate) struct BookingRow {
    pub id: i32,
    pub requester: String,
    pub equipment_id: i32,
    pub date: String,
    pub shift: String,
    pub periods: Vec<i16>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for BookingRecord {
    type Error = AppError;

    fn try_from(row: BookingRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            requester: row.requester,
            equipment_id: row.equipment_id,
            date: row.date,
            shift: row.shift,
            periods: PeriodSet::from_db(&row.periods)?,
            quantity: row.quantity,
            created_at: row.created_at,
        })
    }
}

/// A validated booking ready to be written to the ledger
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub requester: String,
    pub key: SlotKey,
    pub periods: PeriodSet,
    pub quantity: i32,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    /// Booking date, matched verbatim (YYYY-MM-DD in strict mode)
    pub date: String,
    /// Shift label (e.g. "morning")
    pub shift: String,
    /// Period numbers 1-7
    #[serde(default)]
    pub periods: Vec<i64>,
    /// Units to reserve for every selected period
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Query parameters selecting an availability slot
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Date label
    pub date: String,
    /// Shift label
    pub shift: String,
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Remaining units per period, serialized as an object keyed by period number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Availability(BTreeMap<Period, i32>);

impl Availability {
    /// Every period starts at the equipment total
    pub fn full(total: i32) -> Self {
        Self(Period::all().map(|p| (p, total)).collect())
    }

    /// Remaining units after subtracting the given bookings, floored at zero
    pub fn from_bookings<'a>(total: i32, bookings: impl IntoIterator<Item = &'a BookingRecord>) -> Self {
        let mut remaining = Self::full(total);
        for booking in bookings {
            for period in booking.periods.iter() {
                if let Some(left) = remaining.0.get_mut(&period) {
                    *left -= booking.quantity;
                }
            }
        }
        for left in remaining.0.values_mut() {
            *left = (*left).max(0);
        }
        remaining
    }

    pub fn remaining(&self, period: Period) -> i32 {
        self.0.get(&period).copied().unwrap_or(0)
    }

    /// First period (ascending) that cannot take `quantity` more units
    pub fn first_shortfall(&self, periods: &PeriodSet, quantity: i32) -> Option<(Period, i32)> {
        periods
            .iter()
            .map(|p| (p, self.remaining(p)))
            .find(|&(_, left)| quantity > left)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, i32)> + '_ {
        self.0.iter().map(|(&p, &left)| (p, left))
    }
}
