//! Reference data: owners, units, garages and the two extensible catalogs
//! (booking states, movement types).
//!
//! Units and garages are looked up by their human-entered code; codes are
//! stored trimmed and ASCII-uppercased.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

pub mod booking_states;
pub mod garages;
pub mod movement_types;
pub mod owners;
pub mod units;

/// The party owning units and garages and receiving payouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
}

/// A rentable apartment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Option<Uuid>,
}

/// A parking space that may be attached to a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garage {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingState {
    pub id: String,
    pub name: String,
}

/// Financial category of a standalone movement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementType {
    pub id: String,
    pub name: String,
    /// Movements of this type must reference an owner.
    pub requires_owner: bool,
}

impl TryFrom<owners::Model> for Owner {
    type Error = EngineError;

    fn try_from(model: owners::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "owner")?,
            name: model.name,
            national_id: model.national_id,
            phone: model.phone,
        })
    }
}

impl TryFrom<units::Model> for Unit {
    type Error = EngineError;

    fn try_from(model: units::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "unit")?,
            owner_id: parse_optional_uuid(model.owner_id.as_deref(), "owner")?,
            code: model.code,
        })
    }
}

impl TryFrom<garages::Model> for Garage {
    type Error = EngineError;

    fn try_from(model: garages::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "garage")?,
            owner_id: parse_optional_uuid(model.owner_id.as_deref(), "owner")?,
            code: model.code,
        })
    }
}

impl From<booking_states::Model> for BookingState {
    fn from(model: booking_states::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<movement_types::Model> for MovementType {
    fn from(model: movement_types::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            requires_owner: model.requires_owner,
        }
    }
}
