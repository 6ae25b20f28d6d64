use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::lettings::domain::{
    EngineError, OrganizationId, Principal, PropertyId, SettlementDetails, UnitId,
};
use crate::lettings::engine::LettingsEngine;
use crate::lettings::store::{LettingsStore, MemoryStore, StoreError, UnitOfWork};
use crate::lettings::structure::{BuildPropertyRequest, BuiltProperty};
use crate::lettings::tenancy::CreateTenancyRequest;

pub(super) fn principal() -> Principal {
    Principal {
        subject: "agent-wanjiku".to_string(),
        organization_id: OrganizationId(7),
    }
}

pub(super) fn engine() -> (Arc<MemoryStore>, LettingsEngine<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = LettingsEngine::new(store.clone());
    (store, engine)
}

pub(super) fn build_request(
    floor_count: u32,
    units_per_floor: u32,
    custom_floor_units: Option<u32>,
) -> BuildPropertyRequest {
    BuildPropertyRequest {
        name: "Andeche Court".to_string(),
        address: "Likoni Road, Nairobi".to_string(),
        kind: Default::default(),
        floor_count,
        units_per_floor,
        start_floor: 1,
        custom_floor_units,
    }
}

/// Two standard floors of three units each: A01..A03, B01..B03.
pub(super) fn seeded_property(engine: &LettingsEngine<MemoryStore>) -> BuiltProperty {
    engine
        .structure
        .build(&principal(), &build_request(2, 3, None))
        .expect("structure build succeeds")
}

pub(super) fn unit_by_number(built: &BuiltProperty, number: &str) -> UnitId {
    built
        .units
        .iter()
        .find(|unit| unit.unit_number == number)
        .unwrap_or_else(|| panic!("unit {number} exists"))
        .id
}

pub(super) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub(super) fn tenancy_request(
    property_id: PropertyId,
    unit_ids: Vec<UnitId>,
) -> CreateTenancyRequest {
    CreateTenancyRequest {
        property_id,
        unit_ids,
        first_name: "Achieng".to_string(),
        last_name: "Odhiambo".to_string(),
        email: "achieng.odhiambo@example.com".to_string(),
        phone: "+254700111222".to_string(),
        id_number: "30112233".to_string(),
        emergency_contact: "Baraka Odhiambo +254700333444".to_string(),
        monthly_rent: 25_000,
        start_date: start_date(),
    }
}

pub(super) fn settlement() -> SettlementDetails {
    SettlementDetails {
        payment_date: NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date"),
        payment_method: "MPESA".to_string(),
        reference_number: "QX12AB34CD".to_string(),
    }
}

/// Store stub whose every operation fails, for infrastructure-error paths.
pub(super) struct BrokenStore;

impl LettingsStore for BrokenStore {
    fn transaction<T, F>(&self, _work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>,
    {
        Err(StoreError::Unavailable("backing store offline".to_string()).into())
    }

    fn read<T, F>(&self, _work: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, EngineError>,
    {
        Err(StoreError::Unavailable("backing store offline".to_string()).into())
    }
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
