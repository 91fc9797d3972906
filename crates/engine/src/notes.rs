//! Free-text comments ("observaciones") attached to a booking.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub comment: String,
    pub date: NaiveDate,
    pub created_by: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub booking_id: String,
    pub comment: String,
    pub date: Date,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Note {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "note")?,
            booking_id: parse_uuid(&model.booking_id, "booking")?,
            comment: model.comment,
            date: model.date,
            created_by: parse_optional_uuid(model.created_by.as_deref(), "user")?,
        })
    }
}

impl From<&Note> for ActiveModel {
    fn from(value: &Note) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            booking_id: ActiveValue::Set(value.booking_id.to_string()),
            comment: ActiveValue::Set(value.comment.clone()),
            date: ActiveValue::Set(value.date),
            created_by: ActiveValue::Set(value.created_by.map(|id| id.to_string())),
        }
    }
}
