use std::collections::BTreeMap;
use std::sync::Mutex;

use super::domain::{
    EngineError, Floor, FloorId, Organization, OrganizationId, Payment, PaymentId, PaymentStatus,
    Property, PropertyId, TenancyId, TenancyStatus, Tenant, TenantId, Unit, UnitId, UnitStatus,
    UnitTenancy,
};

/// Infrastructure failures raised by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Mutable view of the entity store scoped to one atomic operation.
///
/// Saves are insert-or-update keyed by the entity's own id; callers obtain
/// fresh ids from `next_id` before the first save. Reference integrity is
/// the lifecycle managers' job, so saves here are explicit and ordered
/// rather than cascaded.
pub trait UnitOfWork {
    fn next_id(&mut self) -> u64;

    fn organization(&self, id: OrganizationId) -> Option<Organization>;
    fn save_organization(&mut self, organization: Organization);

    fn property(&self, id: PropertyId) -> Option<Property>;
    fn save_property(&mut self, property: Property);
    fn delete_property(&mut self, id: PropertyId);
    fn properties_by_organization(&self, id: OrganizationId) -> Vec<Property>;

    fn save_floor(&mut self, floor: Floor);
    fn floors_by_property(&self, id: PropertyId) -> Vec<Floor>;

    fn unit(&self, id: UnitId) -> Option<Unit>;
    fn save_unit(&mut self, unit: Unit);
    fn delete_unit(&mut self, id: UnitId);
    fn units_by_property(&self, id: PropertyId) -> Vec<Unit>;
    fn units_by_floor(&self, id: FloorId) -> Vec<Unit>;
    fn units_by_property_and_status(&self, id: PropertyId, status: UnitStatus) -> Vec<Unit>;

    fn tenant(&self, id: TenantId) -> Option<Tenant>;
    fn save_tenant(&mut self, tenant: Tenant);
    fn delete_tenant(&mut self, id: TenantId);
    fn tenants_by_property(&self, id: PropertyId) -> Vec<Tenant>;

    fn tenancy(&self, id: TenancyId) -> Option<UnitTenancy>;
    fn save_tenancy(&mut self, tenancy: UnitTenancy);
    fn delete_tenancy(&mut self, id: TenancyId);
    fn tenancies_by_property(&self, id: PropertyId) -> Vec<UnitTenancy>;
    fn tenancies_by_tenant(&self, id: TenantId) -> Vec<UnitTenancy>;
    fn tenancies_by_unit(&self, id: UnitId) -> Vec<UnitTenancy>;
    fn active_tenancy_for_unit(&self, id: UnitId) -> Option<UnitTenancy>;

    fn payment(&self, id: PaymentId) -> Option<Payment>;
    fn save_payment(&mut self, payment: Payment);
    fn delete_payment(&mut self, id: PaymentId);
    fn payments_by_tenancy(&self, id: TenancyId) -> Vec<Payment>;
    fn payments_by_property(&self, id: PropertyId) -> Vec<Payment>;
    fn payments_by_property_and_status(&self, id: PropertyId, status: PaymentStatus)
        -> Vec<Payment>;
}

/// Storage abstraction so the lifecycle managers can be exercised in
/// isolation and backed by different persistence engines.
pub trait LettingsStore: Send + Sync {
    /// Run `work` as one atomic unit. Writes are visible to later reads
    /// inside the closure but only committed when it returns `Ok`; any
    /// error discards every write.
    fn transaction<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>;

    /// Run `work` for its result only; writes are always discarded.
    fn read<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>;
}

#[derive(Debug, Clone)]
struct StoreState {
    sequence: u64,
    organizations: BTreeMap<u64, Organization>,
    properties: BTreeMap<u64, Property>,
    floors: BTreeMap<u64, Floor>,
    units: BTreeMap<u64, Unit>,
    tenants: BTreeMap<u64, Tenant>,
    tenancies: BTreeMap<u64, UnitTenancy>,
    payments: BTreeMap<u64, Payment>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            sequence: 1,
            organizations: BTreeMap::new(),
            properties: BTreeMap::new(),
            floors: BTreeMap::new(),
            units: BTreeMap::new(),
            tenants: BTreeMap::new(),
            tenancies: BTreeMap::new(),
            payments: BTreeMap::new(),
        }
    }
}

impl UnitOfWork for StoreState {
    fn next_id(&mut self) -> u64 {
        let id = self.sequence;
        self.sequence += 1;
        id
    }

    fn organization(&self, id: OrganizationId) -> Option<Organization> {
        self.organizations.get(&id.0).cloned()
    }

    fn save_organization(&mut self, organization: Organization) {
        self.organizations.insert(organization.id.0, organization);
    }

    fn property(&self, id: PropertyId) -> Option<Property> {
        self.properties.get(&id.0).cloned()
    }

    fn save_property(&mut self, property: Property) {
        self.properties.insert(property.id.0, property);
    }

    fn delete_property(&mut self, id: PropertyId) {
        self.properties.remove(&id.0);
    }

    fn properties_by_organization(&self, id: OrganizationId) -> Vec<Property> {
        self.properties
            .values()
            .filter(|property| property.organization_id == id)
            .cloned()
            .collect()
    }

    fn save_floor(&mut self, floor: Floor) {
        self.floors.insert(floor.id.0, floor);
    }

    fn floors_by_property(&self, id: PropertyId) -> Vec<Floor> {
        self.floors
            .values()
            .filter(|floor| floor.property_id == id)
            .cloned()
            .collect()
    }

    fn unit(&self, id: UnitId) -> Option<Unit> {
        self.units.get(&id.0).cloned()
    }

    fn save_unit(&mut self, unit: Unit) {
        self.units.insert(unit.id.0, unit);
    }

    fn delete_unit(&mut self, id: UnitId) {
        self.units.remove(&id.0);
    }

    fn units_by_property(&self, id: PropertyId) -> Vec<Unit> {
        self.units
            .values()
            .filter(|unit| unit.property_id == id)
            .cloned()
            .collect()
    }

    fn units_by_floor(&self, id: FloorId) -> Vec<Unit> {
        self.units
            .values()
            .filter(|unit| unit.floor_id == id)
            .cloned()
            .collect()
    }

    fn units_by_property_and_status(&self, id: PropertyId, status: UnitStatus) -> Vec<Unit> {
        self.units
            .values()
            .filter(|unit| unit.property_id == id && unit.status == status)
            .cloned()
            .collect()
    }

    fn tenant(&self, id: TenantId) -> Option<Tenant> {
        self.tenants.get(&id.0).cloned()
    }

    fn save_tenant(&mut self, tenant: Tenant) {
        self.tenants.insert(tenant.id.0, tenant);
    }

    fn delete_tenant(&mut self, id: TenantId) {
        self.tenants.remove(&id.0);
    }

    fn tenants_by_property(&self, id: PropertyId) -> Vec<Tenant> {
        self.tenants
            .values()
            .filter(|tenant| tenant.property_id == id)
            .cloned()
            .collect()
    }

    fn tenancy(&self, id: TenancyId) -> Option<UnitTenancy> {
        self.tenancies.get(&id.0).cloned()
    }

    fn save_tenancy(&mut self, tenancy: UnitTenancy) {
        self.tenancies.insert(tenancy.id.0, tenancy);
    }

    fn delete_tenancy(&mut self, id: TenancyId) {
        self.tenancies.remove(&id.0);
    }

    fn tenancies_by_property(&self, id: PropertyId) -> Vec<UnitTenancy> {
        self.tenancies
            .values()
            .filter(|tenancy| tenancy.property_id == id)
            .cloned()
            .collect()
    }

    fn tenancies_by_tenant(&self, id: TenantId) -> Vec<UnitTenancy> {
        self.tenancies
            .values()
            .filter(|tenancy| tenancy.tenant_id == id)
            .cloned()
            .collect()
    }

    fn tenancies_by_unit(&self, id: UnitId) -> Vec<UnitTenancy> {
        self.tenancies
            .values()
            .filter(|tenancy| tenancy.unit_id == id)
            .cloned()
            .collect()
    }

    fn active_tenancy_for_unit(&self, id: UnitId) -> Option<UnitTenancy> {
        self.tenancies
            .values()
            .find(|tenancy| tenancy.unit_id == id && tenancy.status == TenancyStatus::Active)
            .cloned()
    }

    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.payments.get(&id.0).cloned()
    }

    fn save_payment(&mut self, payment: Payment) {
        self.payments.insert(payment.id.0, payment);
    }

    fn delete_payment(&mut self, id: PaymentId) {
        self.payments.remove(&id.0);
    }

    fn payments_by_tenancy(&self, id: TenancyId) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|payment| payment.tenancy_id == id)
            .cloned()
            .collect()
    }

    fn payments_by_property(&self, id: PropertyId) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|payment| payment.property_id == id)
            .cloned()
            .collect()
    }

    fn payments_by_property_and_status(
        &self,
        id: PropertyId,
        status: PaymentStatus,
    ) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|payment| payment.property_id == id && payment.status == status)
            .cloned()
            .collect()
    }
}

/// In-memory reference store. Transactions copy the current state, apply
/// the closure to the copy, and swap it back only on success, which keeps
/// every lifecycle operation all-or-nothing. The mutex serializes writers,
/// so two concurrent tenancy creations cannot both observe a unit as
/// available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LettingsStore for MemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        let mut draft = guard.clone();
        let outcome = work(&mut draft)?;
        *guard = draft;
        Ok(outcome)
    }

    fn read<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>,
    {
        let guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        let mut draft = guard.clone();
        work(&mut draft)
    }
}
