use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    EngineError, Floor, FloorId, Principal, Property, PropertyId, PropertyKind, Unit, UnitId,
    UnitStatus,
};
use super::store::{LettingsStore, UnitOfWork};

fn default_start_floor() -> u32 {
    1
}

/// Parameters for a one-shot property structure build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPropertyRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub kind: PropertyKind,
    pub floor_count: u32,
    pub units_per_floor: u32,
    /// 1-based offset into the floor alphabet; index 1 is floor "A".
    #[serde(default = "default_start_floor")]
    pub start_floor: u32,
    /// When set above zero, one extra floor with this many units is
    /// appended after the last standard floor.
    #[serde(default)]
    pub custom_floor_units: Option<u32>,
}

/// The property together with everything generated under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltProperty {
    pub property: Property,
    pub floors: Vec<Floor>,
    pub units: Vec<Unit>,
}

/// Maps a 1-based floor index to its letter. Anything past 'Z' fails
/// rather than wrapping; double-letter naming is deliberately not offered.
pub(crate) fn floor_letter(index: u32) -> Result<char, EngineError> {
    match index {
        1..=26 => Ok(char::from(b'A' + (index - 1) as u8)),
        _ => Err(EngineError::FloorRange { index }),
    }
}

/// Generates a property's floors and units from counts in one transaction.
pub struct PropertyStructureBuilder<S> {
    store: Arc<S>,
}

impl<S> PropertyStructureBuilder<S>
where
    S: LettingsStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn build(
        &self,
        principal: &Principal,
        request: &BuildPropertyRequest,
    ) -> Result<BuiltProperty, EngineError> {
        let built = self.store.transaction(|uow| {
            let property = Property {
                id: PropertyId(uow.next_id()),
                organization_id: principal.organization_id,
                name: request.name.clone(),
                address: request.address.clone(),
                kind: request.kind,
            };
            uow.save_property(property.clone());

            let mut floors = Vec::new();
            let mut units = Vec::new();

            for offset in 0..request.floor_count {
                let letter = floor_letter(request.start_floor + offset)?;
                let floor = save_floor(uow, &property, letter);
                populate_floor(uow, &property, &floor, request.units_per_floor, &mut units);
                floors.push(floor);
            }

            // A floor count of zero with a custom floor still yields
            // exactly one floor, lettered at the start offset.
            if let Some(custom_units) = request.custom_floor_units.filter(|count| *count > 0) {
                let letter = floor_letter(request.start_floor + request.floor_count)?;
                let floor = save_floor(uow, &property, letter);
                populate_floor(uow, &property, &floor, custom_units, &mut units);
                floors.push(floor);
            }

            Ok(BuiltProperty {
                property,
                floors,
                units,
            })
        })?;

        info!(
            actor = %principal.subject,
            property = %built.property.id,
            floors = built.floors.len(),
            units = built.units.len(),
            "property structure built"
        );

        Ok(built)
    }
}

fn save_floor(uow: &mut dyn UnitOfWork, property: &Property, letter: char) -> Floor {
    let floor = Floor {
        id: FloorId(uow.next_id()),
        property_id: property.id,
        name: letter.to_string(),
    };
    uow.save_floor(floor.clone());
    floor
}

fn populate_floor(
    uow: &mut dyn UnitOfWork,
    property: &Property,
    floor: &Floor,
    count: u32,
    units: &mut Vec<Unit>,
) {
    for sequence in 1..=count {
        let unit = Unit {
            id: UnitId(uow.next_id()),
            property_id: property.id,
            floor_id: floor.id,
            unit_number: format!("{}{:02}", floor.name, sequence),
            status: UnitStatus::Available,
        };
        uow.save_unit(unit.clone());
        units.push(unit);
    }
}
