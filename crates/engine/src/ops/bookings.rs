//! Booking validation and persistence.
//!
//! Validation runs in order and stops at the first failure:
//!
//! 1. required fields (unit, tenant, start and end date)
//! 2. `start_date <= end_date`
//! 3. exchange rate present and `> 0`
//! 4. the unit exists (or is created when the draft asks for it)
//! 5. the state exists; only privileged roles pick a non-default state or
//!    change it
//! 6. no other booking of the unit intersects the inclusive date range
//!
//! Steps 1–3 need no storage. Steps 4–6 and the write share one transaction,
//! and booking writes of one engine are serialized.

use chrono::Utc;
use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, Booking, BookingDraft, CLOSED_STATE, DEFAULT_STATE, EngineError, ResultEngine, UnitRef,
    bookings,
    catalog::{garages, units},
    compute_ledger,
    error::OVERLAP_MESSAGE,
    util::{BookingShape, check_booking_shape, normalize_code, normalize_optional_text},
};

use super::{
    BookingListFilter, Engine, OverlapCheck, ResolveMode, access::as_reference,
    catalog::normalize_state_id, today, with_tx,
};

/// Output of the validator: every reference resolved, ready for the ledger.
struct ValidatedBooking {
    unit: units::Model,
    garage: Option<garages::Model>,
    state_id: String,
    shape: BookingShape,
    note: Option<String>,
}

impl Engine {
    /// Validates and stores a new booking. Totals are derived from the
    /// category amounts.
    pub async fn create_booking(
        &self,
        actor: &Actor,
        draft: BookingDraft,
    ) -> ResultEngine<Booking> {
        let shape = check_booking_shape(&draft)?;
        let _guard = self.booking_writes.lock().await;
        with_tx!(self, |db_tx| {
            let valid = self.validate_booking(&db_tx, actor, &draft, shape, None).await?;
            let ledger = compute_ledger(draft.amounts)?;
            let booking = Booking {
                id: Uuid::new_v4(),
                unit_id: parse_id(&valid.unit.id)?,
                unit_code: valid.unit.code,
                garage_id: valid.garage.as_ref().map(|g| parse_id(&g.id)).transpose()?,
                garage_code: valid.garage.map(|g| g.code),
                tenant: valid.shape.tenant,
                start_date: valid.shape.start_date,
                end_date: valid.shape.end_date,
                state_id: valid.state_id,
                exchange_rate: valid.shape.exchange_rate,
                note: valid.note,
                created_by: Some(actor.user_id),
                created_at: Utc::now(),
                ledger,
            };
            let model: bookings::ActiveModel = (&booking).into();
            model.insert(&db_tx).await?;
            tracing::info!(booking = %booking.id, unit = %booking.unit_code, "booking created");
            Ok(booking)
        })
    }

    /// Replaces a booking with the draft. Author and creation time are kept.
    pub async fn update_booking(
        &self,
        actor: &Actor,
        id: Uuid,
        draft: BookingDraft,
    ) -> ResultEngine<Booking> {
        let shape = check_booking_shape(&draft)?;
        let _guard = self.booking_writes.lock().await;
        with_tx!(self, |db_tx| {
            let existing = self.require_booking(&db_tx, id).await?;
            let valid = self
                .validate_booking(&db_tx, actor, &draft, shape, Some(&existing))
                .await?;
            let ledger = compute_ledger(draft.amounts)?;
            let previous = Booking::try_from((existing, String::new(), None))?;
            let booking = Booking {
                unit_id: parse_id(&valid.unit.id)?,
                unit_code: valid.unit.code,
                garage_id: valid.garage.as_ref().map(|g| parse_id(&g.id)).transpose()?,
                garage_code: valid.garage.map(|g| g.code),
                tenant: valid.shape.tenant,
                start_date: valid.shape.start_date,
                end_date: valid.shape.end_date,
                state_id: valid.state_id,
                exchange_rate: valid.shape.exchange_rate,
                note: valid.note,
                ledger,
                ..previous
            };
            let model: bookings::ActiveModel = (&booking).into();
            model.update(&db_tx).await?;
            tracing::info!(booking = %booking.id, "booking updated");
            Ok(booking)
        })
    }

    /// Hard delete. Notes and linked movements go with it.
    pub async fn delete_booking(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_privileged("delete bookings")?;
        let _guard = self.booking_writes.lock().await;
        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, id).await?;
            bookings::Entity::delete_by_id(booking.id).exec(&db_tx).await?;
            tracing::info!(booking = %id, "booking deleted");
            Ok(())
        })
    }

    pub async fn booking(&self, id: Uuid) -> ResultEngine<Booking> {
        let (model, unit) = bookings::Entity::find_by_id(id.to_string())
            .find_also_related(units::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("booking {id}")))?;
        let garage = match &model.garage_id {
            Some(garage_id) => garages::Entity::find_by_id(garage_id.clone())
                .one(&self.database)
                .await?
                .map(|g| g.code),
            None => None,
        };
        Booking::try_from((model, unit.map(|u| u.code).unwrap_or_default(), garage))
    }

    /// Lists bookings ordered by start date.
    pub async fn bookings(&self, filter: &BookingListFilter) -> ResultEngine<Vec<Booking>> {
        let mut condition = Condition::all();
        if let Some(from) = filter.from {
            condition = condition.add(bookings::Column::EndDate.gte(from));
        }
        if let Some(to) = filter.to {
            condition = condition.add(bookings::Column::StartDate.lte(to));
        }
        if let Some(state) = filter.state.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(bookings::Column::StateId.eq(normalize_state_id(state)?));
        }
        if let Some(code) = filter.unit_code.as_deref().and_then(normalize_code) {
            condition = condition.add(units::Column::Code.eq(code));
        }
        match filter.past {
            Some(true) => condition = condition.add(bookings::Column::EndDate.lt(today())),
            Some(false) => condition = condition.add(bookings::Column::EndDate.gte(today())),
            None => {}
        }

        let rows = bookings::Entity::find()
            .find_also_related(units::Entity)
            .filter(condition)
            .order_by_asc(bookings::Column::StartDate)
            .all(&self.database)
            .await?;

        let garage_codes: std::collections::HashMap<String, String> = garages::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|g| (g.id, g.code))
            .collect();

        rows.into_iter()
            .map(|(model, unit)| {
                let garage = model
                    .garage_id
                    .as_ref()
                    .and_then(|id| garage_codes.get(id).cloned());
                Booking::try_from((model, unit.map(|u| u.code).unwrap_or_default(), garage))
            })
            .collect()
    }

    /// Validator steps 4–6 against the open transaction.
    async fn validate_booking(
        &self,
        db: &DatabaseTransaction,
        actor: &Actor,
        draft: &BookingDraft,
        shape: BookingShape,
        existing: Option<&bookings::Model>,
    ) -> ResultEngine<ValidatedBooking> {
        let mode = if draft.create_missing {
            ResolveMode::CreateMissing
        } else {
            ResolveMode::Existing
        };

        // 4. unit
        let unit = match &shape.unit {
            UnitRef::Id(id) => self.require_unit(db, *id).await.map_err(as_reference)?,
            UnitRef::Code(code) => self
                .resolve_unit_in(db, code, mode)
                .await
                .map_err(as_reference)?,
        };
        let garage = self.resolve_garage_in(db, draft.garage.as_deref(), mode).await?;

        // 5. state
        let requested = match draft.state.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(state) => Some(normalize_state_id(state)?),
            None => None,
        };
        let state_id = match (existing, requested) {
            (None, None) => DEFAULT_STATE.to_string(),
            (Some(existing), None) => existing.state_id.clone(),
            (_, Some(state)) => state,
        };
        self.reference_state(db, &state_id).await?;
        match existing {
            None if state_id != DEFAULT_STATE => {
                actor.require_privileged("create a booking with a non-default state")?;
            }
            Some(existing) if existing.state_id != state_id => {
                actor.require_privileged("change the state of a booking")?;
            }
            Some(existing) if existing.state_id == CLOSED_STATE => {
                actor.require_privileged("edit a closed booking")?;
            }
            _ => {}
        }

        // 6. overlap
        if self.overlap_check == OverlapCheck::Serialized {
            let mut query = bookings::Entity::find()
                .filter(bookings::Column::UnitId.eq(unit.id.clone()))
                .filter(bookings::Column::StartDate.lte(shape.end_date))
                .filter(bookings::Column::EndDate.gte(shape.start_date));
            if let Some(existing) = existing {
                query = query.filter(bookings::Column::Id.ne(existing.id.clone()));
            }
            if let Some(other) = query.one(db).await? {
                tracing::debug!(unit = %unit.code, other = %other.id, "overlapping booking rejected");
                return Err(EngineError::Overlap(OVERLAP_MESSAGE.to_string()));
            }
        }

        Ok(ValidatedBooking {
            unit,
            garage,
            state_id,
            note: normalize_optional_text(draft.note.as_deref()),
            shape,
        })
    }
}

fn parse_id(value: &str) -> ResultEngine<Uuid> {
    crate::util::parse_uuid(value, "reference")
}
