use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{EngineError, PaymentStatus, Principal, PropertyId, UnitStatus};
use super::store::{LettingsStore, UnitOfWork};

/// Occupancy and payment rollup for a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyStats {
    pub property_id: PropertyId,
    pub total_units: usize,
    pub available_units: usize,
    pub occupied_units: usize,
    /// Whole-percent occupancy; zero for a property with no units.
    pub occupancy_rate: usize,
    pub tenant_count: usize,
    pub pending_payments: usize,
    pub completed_payments: usize,
    pub overdue_payments: usize,
}

/// Read-only reporting over the entity store. Nothing here mutates state.
pub struct Dashboard<S> {
    store: Arc<S>,
}

impl<S> Dashboard<S>
where
    S: LettingsStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn property_stats(
        &self,
        _principal: &Principal,
        property_id: PropertyId,
    ) -> Result<PropertyStats, EngineError> {
        self.store.read(|uow| {
            uow.property(property_id)
                .ok_or_else(|| EngineError::not_found("property", property_id.0))?;

            let total_units = uow.units_by_property(property_id).len();
            let available_units = uow
                .units_by_property_and_status(property_id, UnitStatus::Available)
                .len();
            let occupied_units = uow
                .units_by_property_and_status(property_id, UnitStatus::Occupied)
                .len();
            let occupancy_rate = if total_units > 0 {
                occupied_units * 100 / total_units
            } else {
                0
            };

            Ok(PropertyStats {
                property_id,
                total_units,
                available_units,
                occupied_units,
                occupancy_rate,
                tenant_count: uow.tenants_by_property(property_id).len(),
                pending_payments: uow
                    .payments_by_property_and_status(property_id, PaymentStatus::Pending)
                    .len(),
                completed_payments: uow
                    .payments_by_property_and_status(property_id, PaymentStatus::Paid)
                    .len(),
                overdue_payments: uow
                    .payments_by_property_and_status(property_id, PaymentStatus::Overdue)
                    .len(),
            })
        })
    }
}
