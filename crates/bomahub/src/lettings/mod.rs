//! The lettings engine: property structure builds, the unit occupancy
//! state machine, tenancy lifecycle, rent scheduling, and the dashboard
//! rollups, all coordinated through an atomic entity-store seam.

pub mod dashboard;
pub mod domain;
mod engine;
pub mod payments;
pub mod router;
pub mod store;
pub mod structure;
pub mod tenancy;

#[cfg(test)]
mod tests;

pub use dashboard::{Dashboard, PropertyStats};
pub use domain::{
    EngineError, ErrorKind, Floor, FloorId, Organization, OrganizationId, Payment, PaymentId,
    PaymentStatus, Principal, Property, PropertyId, PropertyKind, SettlementDetails, TenancyId,
    TenancyStatus, Tenant, TenantId, Unit, UnitId, UnitStatus, UnitTenancy,
};
pub use engine::LettingsEngine;
pub use payments::{PaymentScheduler, ProcessPaymentRequest};
pub use router::lettings_router;
pub use store::{LettingsStore, MemoryStore, StoreError, UnitOfWork};
pub use structure::{BuildPropertyRequest, BuiltProperty, PropertyStructureBuilder};
pub use tenancy::{CreateTenancyRequest, NewTenancy, TenancyLifecycle};
