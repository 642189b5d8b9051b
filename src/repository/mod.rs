//! Repository layer for equipment, bookings and users
//!
//! Each store is a trait so the services run unchanged on PostgreSQL or on the
//! in-memory backend.

pub mod bookings;
pub mod equipment;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        booking::{BookingRecord, NewBooking, SlotKey},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::{NewUser, User},
    },
};

/// Inventory of bookable equipment
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// List all equipment ordered by name
    async fn list(&self) -> AppResult<Vec<Equipment>>;

    /// Get equipment by ID, `NotFound` when unknown
    async fn get_by_id(&self, id: i32) -> AppResult<Equipment>;

    async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment>;

    async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment>;
}

/// Append-only record of bookings
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Bookings recorded for one equipment, date and shift
    async fn list_for_slot(&self, key: &SlotKey) -> AppResult<Vec<BookingRecord>>;

    /// Bookings made by a requester, newest first
    async fn list_for_requester(&self, requester: &str) -> AppResult<Vec<BookingRecord>>;

    async fn insert(&self, booking: &NewBooking) -> AppResult<BookingRecord>;
}

/// Users known from previous logins
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, data: &NewUser) -> AppResult<User>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pub pool: Option<Pool<Postgres>>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub bookings: Arc<dyn BookingLedger>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: Arc::new(equipment::EquipmentRepository::new(pool.clone())),
            bookings: Arc::new(bookings::BookingsRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            pool: None,
            equipment: store.clone(),
            bookings: store.clone(),
            users: store,
        }
    }

    /// Check that the underlying storage answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
