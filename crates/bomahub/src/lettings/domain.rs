use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::store::StoreError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(OrganizationId);
entity_id!(PropertyId);
entity_id!(FloorId);
entity_id!(UnitId);
entity_id!(TenantId);
entity_id!(
    /// Identifier for a unit tenancy agreement.
    TenancyId
);
entity_id!(PaymentId);

/// Authenticated caller context. Every lifecycle operation takes one
/// explicitly; there is no ambient session lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub organization_id: OrganizationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Residential,
    Commercial,
    MixedUse,
}

impl Default for PropertyKind {
    fn default() -> Self {
        Self::Residential
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    pub kind: PropertyKind,
}

/// A lettered floor within a property, e.g. "A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub property_id: PropertyId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Occupied,
}

impl UnitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Occupied => "occupied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub property_id: PropertyId,
    pub floor_id: FloorId,
    pub unit_number: String,
    pub status: UnitStatus,
}

impl Unit {
    /// Checked `available -> occupied` transition. The occupancy status and
    /// the active tenancy referencing this unit move together, so every
    /// occupy goes through here.
    pub fn occupy(&mut self) -> Result<(), EngineError> {
        match self.status {
            UnitStatus::Available => {
                self.status = UnitStatus::Occupied;
                Ok(())
            }
            UnitStatus::Occupied => Err(EngineError::UnitUnavailable {
                unit_number: self.unit_number.clone(),
            }),
        }
    }

    /// `occupied -> available`, fired when the active tenancy ends.
    pub fn release(&mut self) {
        self.status = UnitStatus::Available;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub property_id: PropertyId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub id_number: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyStatus {
    Active,
    Ended,
}

/// Agreement binding one tenant to one unit at a monthly rent. A unit has
/// at most one active tenancy at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTenancy {
    pub id: TenancyId,
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
    pub property_id: PropertyId,
    pub monthly_rent: u32,
    pub start_date: NaiveDate,
    pub status: TenancyStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

/// A single charge against a tenancy. Settlement fields stay empty until
/// the payment is marked paid, which happens at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub tenancy_id: TenancyId,
    pub property_id: PropertyId,
    pub amount: u32,
    pub description: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub status: PaymentStatus,
}

/// Settlement metadata stamped onto a payment when it is marked paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDetails {
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub reference_number: String,
}

/// Broad classification used to map engine failures onto the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Invalid,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("unit {unit_number} is not available")]
    UnitUnavailable { unit_number: String },
    #[error("payment {payment} does not belong to tenant {tenant}")]
    ForeignPayment { payment: PaymentId, tenant: TenantId },
    #[error("floor index {index} is outside the supported A-Z range")]
    FloorRange { index: u32 },
    #[error("settlement details are required to mark payment {0} paid")]
    SettlementRequired(PaymentId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::UnitUnavailable { .. } => ErrorKind::Conflict,
            EngineError::ForeignPayment { .. } => ErrorKind::Forbidden,
            EngineError::FloorRange { .. } | EngineError::SettlementRequired(_) => {
                ErrorKind::Invalid
            }
            EngineError::Store(_) => ErrorKind::Internal,
        }
    }
}
