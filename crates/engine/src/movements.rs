//! Standalone ledger lines.
//!
//! A movement carries its own amount pair and its own exchange rate and is
//! never aggregated into a booking total.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExchangeRate, MoneyCents,
    catalog::{movement_types, owners},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub type_id: String,
    pub amount_local: Option<MoneyCents>,
    pub amount_foreign: Option<MoneyCents>,
    pub exchange_rate: ExchangeRate,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub type_id: String,
    pub amount_local: Option<i64>,
    pub amount_foreign: Option<i64>,
    pub exchange_rate: i64,
    pub note: Option<String>,
    pub date: Date,
    pub created_by: Option<String>,
    pub owner_id: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "movement_types::Entity",
        from = "Column::TypeId",
        to = "movement_types::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MovementTypes,
    #[sea_orm(
        belongs_to = "owners::Entity",
        from = "Column::OwnerId",
        to = "owners::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Owners,
}

impl Related<movement_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementTypes.def()
    }
}

impl Related<owners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Movement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "movement")?,
            type_id: model.type_id,
            amount_local: model.amount_local.map(MoneyCents::new),
            amount_foreign: model.amount_foreign.map(MoneyCents::new),
            exchange_rate: ExchangeRate::from_hundredths(model.exchange_rate),
            note: model.note,
            date: model.date,
            created_by: parse_optional_uuid(model.created_by.as_deref(), "user")?,
            owner_id: parse_optional_uuid(model.owner_id.as_deref(), "owner")?,
            booking_id: parse_optional_uuid(model.booking_id.as_deref(), "booking")?,
        })
    }
}

impl From<&Movement> for ActiveModel {
    fn from(value: &Movement) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            type_id: ActiveValue::Set(value.type_id.clone()),
            amount_local: ActiveValue::Set(value.amount_local.map(MoneyCents::cents)),
            amount_foreign: ActiveValue::Set(value.amount_foreign.map(MoneyCents::cents)),
            exchange_rate: ActiveValue::Set(value.exchange_rate.hundredths()),
            note: ActiveValue::Set(value.note.clone()),
            date: ActiveValue::Set(value.date),
            created_by: ActiveValue::Set(value.created_by.map(|id| id.to_string())),
            owner_id: ActiveValue::Set(value.owner_id.map(|id| id.to_string())),
            booking_id: ActiveValue::Set(value.booking_id.map(|id| id.to_string())),
        }
    }
}
