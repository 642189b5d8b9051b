//! In-memory storage backend
//!
//! Used for local runs without PostgreSQL and by the test suites. Identifiers
//! are assigned sequentially per table, like a `SERIAL` column.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookingLedger, EquipmentStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingRecord, NewBooking, SlotKey},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::{NewUser, User},
    },
};

#[derive(Default)]
struct Tables {
    equipment: Vec<Equipment>,
    bookings: Vec<BookingRecord>,
    users: Vec<User>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn next_id(len: usize) -> AppResult<i32> {
    i32::try_from(len + 1).map_err(|_| AppError::Internal("Identifier space exhausted".to_string()))
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let tables = self.tables.read().await;
        let mut rows = tables.equipment.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        let tables = self.tables.read().await;
        tables
            .equipment
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let mut tables = self.tables.write().await;
        let row = Equipment {
            id: next_id(tables.equipment.len())?,
            name: data.name.clone(),
            total: data.total,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.equipment.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut tables = self.tables.write().await;
        let row = tables
            .equipment
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        if let Some(ref name) = data.name { row.name = name.clone(); }
        if let Some(total) = data.total { row.total = total; }
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }
}

#[async_trait]
impl BookingLedger for MemoryStore {
    async fn list_for_slot(&self, key: &SlotKey) -> AppResult<Vec<BookingRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .filter(|b| b.key() == *key)
            .cloned()
            .collect())
    }

    async fn list_for_requester(&self, requester: &str) -> AppResult<Vec<BookingRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .rev()
            .filter(|b| b.requester == requester)
            .cloned()
            .collect())
    }

    async fn insert(&self, booking: &NewBooking) -> AppResult<BookingRecord> {
        let mut tables = self.tables.write().await;
        if !tables.equipment.iter().any(|e| e.id == booking.key.equipment_id) {
            return Err(AppError::NotFound(format!(
                "Equipment {} not found",
                booking.key.equipment_id
            )));
        }

        let row = BookingRecord {
            id: next_id(tables.bookings.len())?,
            requester: booking.requester.clone(),
            equipment_id: booking.key.equipment_id,
            date: booking.key.date.clone(),
            shift: booking.key.shift.clone(),
            periods: booking.periods.clone(),
            quantity: booking.quantity,
            created_at: Utc::now(),
        };
        tables.bookings.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.iter().find(|u| u.email.eq_ignore_ascii_case(&data.email)) {
            return Ok(existing.clone());
        }

        let user = User {
            id: next_id(tables.users.len())?,
            provider_id: data.provider_id.clone(),
            name: data.name.clone(),
            email: data.email.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}
