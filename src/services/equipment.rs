//! Equipment service (inventory store)

use validator::Validate;

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let equipment = self.repository.equipment.create(data).await?;
        tracing::info!(equipment_id = equipment.id, name = %equipment.name, total = equipment.total, "Equipment created");
        Ok(equipment)
    }

    /// Totals may go below what is already booked; availability clamps at zero
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        let equipment = self.repository.equipment.update(id, data).await?;
        tracing::info!(equipment_id = equipment.id, total = equipment.total, "Equipment updated");
        Ok(equipment)
    }
}
