use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    EngineError, Payment, PaymentId, PaymentStatus, Principal, PropertyId, TenancyId,
    TenancyStatus, Tenant, TenantId, UnitId, UnitTenancy,
};
use super::store::{LettingsStore, UnitOfWork};

/// Days between a tenancy's start date and its first rent due date.
const FIRST_RENT_GRACE_DAYS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTenancyRequest {
    pub property_id: PropertyId,
    pub unit_ids: Vec<UnitId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub id_number: String,
    pub emergency_contact: String,
    pub monthly_rent: u32,
    pub start_date: NaiveDate,
}

/// Direct single-unit tenancy parameters for callers that already hold a
/// tenant record. Unlike the complete path this does not bootstrap the
/// deposit and first-rent payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTenancy {
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
    pub property_id: PropertyId,
    pub monthly_rent: u32,
    pub start_date: NaiveDate,
}

/// Creates and ends unit tenancies, keeping unit occupancy, the tenancy
/// record, and the bootstrap payments in one atomic unit of work.
pub struct TenancyLifecycle<S> {
    store: Arc<S>,
}

impl<S> TenancyLifecycle<S>
where
    S: LettingsStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Onboards a tenant across one or more units: persists the tenant,
    /// opens an active tenancy per unit, occupies each unit, and raises
    /// the security deposit and first rent charge for each tenancy. Any
    /// failure rolls the whole batch back.
    pub fn create_complete_tenancy(
        &self,
        principal: &Principal,
        request: &CreateTenancyRequest,
    ) -> Result<TenantId, EngineError> {
        let tenant_id = self.store.transaction(|uow| {
            let property = uow
                .property(request.property_id)
                .ok_or_else(|| EngineError::not_found("property", request.property_id.0))?;

            let tenant = Tenant {
                id: TenantId(uow.next_id()),
                property_id: property.id,
                name: format!("{} {}", request.first_name, request.last_name),
                email: request.email.clone(),
                phone: request.phone.clone(),
                id_number: request.id_number.clone(),
                emergency_contact: request.emergency_contact.clone(),
            };
            uow.save_tenant(tenant.clone());

            for unit_id in &request.unit_ids {
                let mut unit = uow
                    .unit(*unit_id)
                    .ok_or_else(|| EngineError::not_found("unit", unit_id.0))?;

                unit.occupy()?;

                let tenancy = UnitTenancy {
                    id: TenancyId(uow.next_id()),
                    tenant_id: tenant.id,
                    unit_id: unit.id,
                    property_id: property.id,
                    monthly_rent: request.monthly_rent,
                    start_date: request.start_date,
                    status: TenancyStatus::Active,
                };
                uow.save_tenancy(tenancy.clone());
                uow.save_unit(unit.clone());

                raise_move_in_charges(uow, &tenancy, &unit.unit_number);
            }

            Ok(tenant.id)
        })?;

        info!(
            actor = %principal.subject,
            tenant = %tenant_id,
            units = request.unit_ids.len(),
            "tenancy created"
        );

        Ok(tenant_id)
    }

    /// Ends an active tenancy and releases its unit. An unknown or
    /// already-ended tenancy fails not-found and changes nothing.
    pub fn end_tenancy(&self, principal: &Principal, id: TenancyId) -> Result<(), EngineError> {
        self.store.transaction(|uow| {
            let mut tenancy = uow
                .tenancy(id)
                .filter(|tenancy| tenancy.status == TenancyStatus::Active)
                .ok_or_else(|| EngineError::not_found("active tenancy", id.0))?;

            tenancy.status = TenancyStatus::Ended;
            uow.save_tenancy(tenancy.clone());

            let mut unit = uow
                .unit(tenancy.unit_id)
                .ok_or_else(|| EngineError::not_found("unit", tenancy.unit_id.0))?;
            unit.release();
            uow.save_unit(unit);

            Ok(())
        })?;

        info!(actor = %principal.subject, tenancy = %id, "tenancy ended");
        Ok(())
    }

    /// Opens a single tenancy directly. Goes through the same checked
    /// occupancy transition as the complete path; an occupied unit is a
    /// conflict here too.
    pub fn create_unit_tenancy(
        &self,
        principal: &Principal,
        new_tenancy: &NewTenancy,
    ) -> Result<TenancyId, EngineError> {
        let tenancy_id = self.store.transaction(|uow| {
            uow.tenant(new_tenancy.tenant_id)
                .ok_or_else(|| EngineError::not_found("tenant", new_tenancy.tenant_id.0))?;
            uow.property(new_tenancy.property_id)
                .ok_or_else(|| EngineError::not_found("property", new_tenancy.property_id.0))?;

            let mut unit = uow
                .unit(new_tenancy.unit_id)
                .ok_or_else(|| EngineError::not_found("unit", new_tenancy.unit_id.0))?;
            unit.occupy()?;

            let tenancy = UnitTenancy {
                id: TenancyId(uow.next_id()),
                tenant_id: new_tenancy.tenant_id,
                unit_id: new_tenancy.unit_id,
                property_id: new_tenancy.property_id,
                monthly_rent: new_tenancy.monthly_rent,
                start_date: new_tenancy.start_date,
                status: TenancyStatus::Active,
            };
            uow.save_tenancy(tenancy.clone());
            uow.save_unit(unit);

            Ok(tenancy.id)
        })?;

        info!(actor = %principal.subject, tenancy = %tenancy_id, "unit tenancy created");
        Ok(tenancy_id)
    }
}

/// Raises the two move-in charges for a fresh tenancy: the security
/// deposit (one month's rent, due on the start date) and the first rent
/// charge (due after the grace period).
fn raise_move_in_charges(uow: &mut dyn UnitOfWork, tenancy: &UnitTenancy, unit_number: &str) {
    let deposit = Payment {
        id: PaymentId(uow.next_id()),
        tenancy_id: tenancy.id,
        property_id: tenancy.property_id,
        amount: tenancy.monthly_rent,
        description: format!("Security Deposit - Unit {unit_number}"),
        due_date: tenancy.start_date,
        payment_date: None,
        payment_method: None,
        reference_number: None,
        status: PaymentStatus::Pending,
    };
    uow.save_payment(deposit);

    let first_rent = Payment {
        id: PaymentId(uow.next_id()),
        tenancy_id: tenancy.id,
        property_id: tenancy.property_id,
        amount: tenancy.monthly_rent,
        description: format!("Rent - {}", tenancy.start_date.format("%B %Y")),
        due_date: tenancy.start_date + Duration::days(FIRST_RENT_GRACE_DAYS),
        payment_date: None,
        payment_method: None,
        reference_number: None,
        status: PaymentStatus::Pending,
    };
    uow.save_payment(first_rent);
}
