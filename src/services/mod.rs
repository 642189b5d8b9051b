//! Business logic services

pub mod auth;
pub mod bookings;
pub mod equipment;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub equipment: equipment::EquipmentService,
    pub bookings: bookings::BookingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), config.oauth.clone())?,
            equipment: equipment::EquipmentService::new(repository.clone()),
            bookings: bookings::BookingsService::new(repository.clone(), config.booking.clone()),
            repository,
        })
    }
}
