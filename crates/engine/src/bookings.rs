//! The module contains the `Booking` struct and its table.
//!
//! A booking reserves one unit (and optionally a garage) for an inclusive
//! date range. It owns its ledger: the category amounts are stored as entered
//! and the totals are always recomputed with [`compute_ledger`] on write.
//!
//! [`compute_ledger`]: crate::compute_ledger

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AmountPair, BookingAmounts, EngineError, ExchangeRate, Ledger, MoneyCents,
    catalog::{garages, units},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub unit_code: String,
    pub garage_id: Option<Uuid>,
    pub garage_code: Option<String>,
    pub tenant: String,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub state_id: String,
    pub exchange_rate: ExchangeRate,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub ledger: Ledger,
}

impl Booking {
    /// "Past" is derived from the end date and never stored.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Inclusive range intersection.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub unit_id: String,
    pub garage_id: Option<String>,
    pub tenant: String,
    pub start_date: Date,
    pub end_date: Date,
    pub state_id: String,
    pub exchange_rate: i64,
    pub note: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTimeUtc,
    pub total_local: i64,
    pub total_foreign: i64,
    pub tenant_local: Option<i64>,
    pub tenant_foreign: Option<i64>,
    pub owner_local: Option<i64>,
    pub owner_foreign: Option<i64>,
    pub cleaning_local: Option<i64>,
    pub cleaning_foreign: Option<i64>,
    pub reception_local: Option<i64>,
    pub reception_foreign: Option<i64>,
    pub commission_local: Option<i64>,
    pub commission_foreign: Option<i64>,
    pub advertising_local: Option<i64>,
    pub advertising_foreign: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "units::Entity",
        from = "Column::UnitId",
        to = "units::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Units,
    #[sea_orm(
        belongs_to = "garages::Entity",
        from = "Column::GarageId",
        to = "garages::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Garages,
}

impl Related<units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl Related<garages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Garages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn pair(local: Option<i64>, foreign: Option<i64>) -> AmountPair {
    AmountPair::new(local.map(MoneyCents::new), foreign.map(MoneyCents::new))
}

fn cents(value: Option<MoneyCents>) -> ActiveValue<Option<i64>> {
    ActiveValue::Set(value.map(MoneyCents::cents))
}

impl Model {
    pub(crate) fn amounts(&self) -> BookingAmounts {
        BookingAmounts {
            tenant: pair(self.tenant_local, self.tenant_foreign),
            owner: pair(self.owner_local, self.owner_foreign),
            cleaning: pair(self.cleaning_local, self.cleaning_foreign),
            reception: pair(self.reception_local, self.reception_foreign),
            commission: pair(self.commission_local, self.commission_foreign),
            advertising: pair(self.advertising_local, self.advertising_foreign),
        }
    }
}

/// Builds the domain value from a row plus the codes of its unit and garage.
impl TryFrom<(Model, String, Option<String>)> for Booking {
    type Error = EngineError;

    fn try_from(
        (model, unit_code, garage_code): (Model, String, Option<String>),
    ) -> Result<Self, Self::Error> {
        let amounts = model.amounts();
        Ok(Self {
            id: parse_uuid(&model.id, "booking")?,
            unit_id: parse_uuid(&model.unit_id, "unit")?,
            unit_code,
            garage_id: parse_optional_uuid(model.garage_id.as_deref(), "garage")?,
            garage_code,
            tenant: model.tenant,
            start_date: model.start_date,
            end_date: model.end_date,
            state_id: model.state_id,
            exchange_rate: ExchangeRate::from_hundredths(model.exchange_rate),
            note: model.note,
            created_by: parse_optional_uuid(model.created_by.as_deref(), "user")?,
            created_at: model.created_at,
            ledger: Ledger {
                amounts,
                total_local: MoneyCents::new(model.total_local),
                total_foreign: MoneyCents::new(model.total_foreign),
            },
        })
    }
}

impl From<&Booking> for ActiveModel {
    fn from(value: &Booking) -> Self {
        let amounts = &value.ledger.amounts;
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            unit_id: ActiveValue::Set(value.unit_id.to_string()),
            garage_id: ActiveValue::Set(value.garage_id.map(|id| id.to_string())),
            tenant: ActiveValue::Set(value.tenant.clone()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            state_id: ActiveValue::Set(value.state_id.clone()),
            exchange_rate: ActiveValue::Set(value.exchange_rate.hundredths()),
            note: ActiveValue::Set(value.note.clone()),
            created_by: ActiveValue::Set(value.created_by.map(|id| id.to_string())),
            created_at: ActiveValue::Set(value.created_at),
            total_local: ActiveValue::Set(value.ledger.total_local.cents()),
            total_foreign: ActiveValue::Set(value.ledger.total_foreign.cents()),
            tenant_local: cents(amounts.tenant.local),
            tenant_foreign: cents(amounts.tenant.foreign),
            owner_local: cents(amounts.owner.local),
            owner_foreign: cents(amounts.owner.foreign),
            cleaning_local: cents(amounts.cleaning.local),
            cleaning_foreign: cents(amounts.cleaning.foreign),
            reception_local: cents(amounts.reception.local),
            reception_foreign: cents(amounts.reception.foreign),
            commission_local: cents(amounts.commission.local),
            commission_foreign: cents(amounts.commission.foreign),
            advertising_local: cents(amounts.advertising.local),
            advertising_foreign: cents(amounts.advertising.foreign),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(start: NaiveDate, end: NaiveDate) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            unit_code: "B216".to_string(),
            garage_id: None,
            garage_code: None,
            tenant: "Pérez".to_string(),
            start_date: start,
            end_date: end,
            state_id: crate::DEFAULT_STATE.to_string(),
            exchange_rate: ExchangeRate::from_hundredths(100_000),
            note: None,
            created_by: None,
            created_at: Utc::now(),
            ledger: Ledger::default(),
        }
    }

    #[test]
    fn past_is_strictly_before_today() {
        let b = booking(date(2025, 3, 1), date(2025, 3, 10));
        assert!(b.is_past(date(2025, 3, 11)));
        assert!(!b.is_past(date(2025, 3, 10)));
    }

    #[test]
    fn inclusive_overlap() {
        let b = booking(date(2025, 3, 1), date(2025, 3, 10));
        assert!(b.overlaps(date(2025, 3, 10), date(2025, 3, 12)));
        assert!(b.overlaps(date(2025, 3, 5), date(2025, 3, 7)));
        assert!(!b.overlaps(date(2025, 3, 11), date(2025, 3, 15)));
        assert!(!b.overlaps(date(2025, 2, 1), date(2025, 2, 28)));
    }
}
