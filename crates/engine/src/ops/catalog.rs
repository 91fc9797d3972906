//! Reference-data resolver and catalog maintenance.
//!
//! Unit and garage codes are resolved with idempotent find-or-create: a code
//! that already exists is never inserted twice, even when two writers race.

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Actor, BookingState, EngineError, Garage, MovementType, NewOwner, Owner, ResultEngine, Unit,
    bookings,
    catalog::{booking_states, garages, movement_types, owners, units},
    movements,
    util::{normalize_code, normalize_optional_text, normalize_required_name},
};

use super::{Engine, ResolveMode, with_tx};

/// Catalog ids (`active`, `owner`, ...) are trimmed lowercase strings.
fn normalize_catalog_id(value: &str, label: &str) -> ResultEngine<String> {
    let id = value.trim().to_lowercase();
    if id.is_empty() {
        return Err(EngineError::Validation(format!("{label} id must not be empty")));
    }
    Ok(id)
}

impl Engine {
    /// Resolves a unit code to its id.
    ///
    /// With [`ResolveMode::Existing`] an unknown code fails with
    /// `KeyNotFound`; with [`ResolveMode::CreateMissing`] the unit is created.
    pub async fn resolve_unit(&self, code: &str, mode: ResolveMode) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let unit = self.resolve_unit_in(&db_tx, code, mode).await?;
            Unit::try_from(unit).map(|unit| unit.id)
        })
    }

    /// Resolves an optional garage code. Absent, empty or (in `Existing`
    /// mode) unknown codes give `None`.
    pub async fn resolve_garage(
        &self,
        code: Option<&str>,
        mode: ResolveMode,
    ) -> ResultEngine<Option<Uuid>> {
        with_tx!(self, |db_tx| {
            match self.resolve_garage_in(&db_tx, code, mode).await? {
                Some(garage) => Garage::try_from(garage).map(|garage| Some(garage.id)),
                None => Ok(None),
            }
        })
    }

    pub(super) async fn resolve_unit_in<C: ConnectionTrait>(
        &self,
        db: &C,
        code: &str,
        mode: ResolveMode,
    ) -> ResultEngine<units::Model> {
        let code = normalize_code(code)
            .ok_or_else(|| EngineError::Validation("unit code must not be empty".to_string()))?;
        if let Some(unit) = find_unit_by_code(db, &code).await? {
            return Ok(unit);
        }
        if mode == ResolveMode::Existing {
            return Err(EngineError::KeyNotFound(format!("unit {code}")));
        }

        let active = units::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            code: ActiveValue::Set(code.clone()),
            owner_id: ActiveValue::Set(None),
        };
        units::Entity::insert(active)
            .on_conflict(OnConflict::column(units::Column::Code).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
        tracing::info!(%code, "unit created on first reference");

        find_unit_by_code(db, &code)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("unit {code}")))
    }

    pub(super) async fn resolve_garage_in<C: ConnectionTrait>(
        &self,
        db: &C,
        code: Option<&str>,
        mode: ResolveMode,
    ) -> ResultEngine<Option<garages::Model>> {
        let Some(code) = code.and_then(normalize_code) else {
            return Ok(None);
        };
        if let Some(garage) = find_garage_by_code(db, &code).await? {
            return Ok(Some(garage));
        }
        if mode == ResolveMode::Existing {
            tracing::debug!(%code, "unknown garage code ignored");
            return Ok(None);
        }

        let active = garages::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            code: ActiveValue::Set(code.clone()),
            owner_id: ActiveValue::Set(None),
        };
        garages::Entity::insert(active)
            .on_conflict(OnConflict::column(garages::Column::Code).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
        tracing::info!(%code, "garage created on first reference");

        find_garage_by_code(db, &code).await
    }

    // ── Units ────────────────────────────────────────────────────────────

    /// Creates a unit. Unlike the resolver, an existing code is a conflict.
    pub async fn create_unit(&self, code: &str, owner_id: Option<Uuid>) -> ResultEngine<Unit> {
        let code = normalize_code(code)
            .ok_or_else(|| EngineError::Validation("unit code must not be empty".to_string()))?;
        with_tx!(self, |db_tx| {
            if find_unit_by_code(&db_tx, &code).await?.is_some() {
                return Err(EngineError::ExistingKey(code));
            }
            self.reference_owner(&db_tx, owner_id).await?;

            let unit = Unit {
                id: Uuid::new_v4(),
                code,
                owner_id,
            };
            units::ActiveModel {
                id: ActiveValue::Set(unit.id.to_string()),
                code: ActiveValue::Set(unit.code.clone()),
                owner_id: ActiveValue::Set(owner_id.map(|id| id.to_string())),
            }
            .insert(&db_tx)
            .await?;
            Ok(unit)
        })
    }

    pub async fn units(&self) -> ResultEngine<Vec<Unit>> {
        units::Entity::find()
            .order_by_asc(units::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Unit::try_from)
            .collect()
    }

    pub async fn unit(&self, id: Uuid) -> ResultEngine<Unit> {
        Unit::try_from(self.require_unit(&self.database, id).await?)
    }

    /// Deletes a unit. Refused while bookings reference it.
    pub async fn delete_unit(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_privileged("delete units")?;
        with_tx!(self, |db_tx| {
            let unit = self.require_unit(&db_tx, id).await?;
            let in_use = bookings::Entity::find()
                .filter(bookings::Column::UnitId.eq(unit.id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(EngineError::InUse(format!(
                    "unit {} has bookings",
                    unit.code
                )));
            }
            units::Entity::delete_by_id(unit.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    // ── Garages ──────────────────────────────────────────────────────────

    pub async fn create_garage(
        &self,
        code: &str,
        owner_id: Option<Uuid>,
    ) -> ResultEngine<Garage> {
        let code = normalize_code(code)
            .ok_or_else(|| EngineError::Validation("garage code must not be empty".to_string()))?;
        with_tx!(self, |db_tx| {
            if find_garage_by_code(&db_tx, &code).await?.is_some() {
                return Err(EngineError::ExistingKey(code));
            }
            self.reference_owner(&db_tx, owner_id).await?;

            let garage = Garage {
                id: Uuid::new_v4(),
                code,
                owner_id,
            };
            garages::ActiveModel {
                id: ActiveValue::Set(garage.id.to_string()),
                code: ActiveValue::Set(garage.code.clone()),
                owner_id: ActiveValue::Set(owner_id.map(|id| id.to_string())),
            }
            .insert(&db_tx)
            .await?;
            Ok(garage)
        })
    }

    pub async fn garages(&self) -> ResultEngine<Vec<Garage>> {
        garages::Entity::find()
            .order_by_asc(garages::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Garage::try_from)
            .collect()
    }

    /// Deletes a garage; bookings using it lose their garage.
    pub async fn delete_garage(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_privileged("delete garages")?;
        with_tx!(self, |db_tx| {
            let garage = self.require_garage(&db_tx, id).await?;
            garages::Entity::delete_by_id(garage.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    // ── Owners ───────────────────────────────────────────────────────────

    /// Creates an owner. A taken national id is a conflict.
    pub async fn create_owner(&self, cmd: NewOwner) -> ResultEngine<Owner> {
        let owner = Owner {
            id: Uuid::new_v4(),
            name: normalize_required_name(&cmd.name, "owner")?,
            national_id: normalize_optional_text(cmd.national_id.as_deref()),
            phone: normalize_optional_text(cmd.phone.as_deref()),
        };
        with_tx!(self, |db_tx| {
            self.ensure_national_id_free(&db_tx, owner.national_id.as_deref(), None)
                .await?;
            owner_active_model(&owner).insert(&db_tx).await?;
            Ok(owner)
        })
    }

    /// Replaces name, national id and phone of an owner.
    pub async fn update_owner(&self, id: Uuid, cmd: NewOwner) -> ResultEngine<Owner> {
        let owner = Owner {
            id,
            name: normalize_required_name(&cmd.name, "owner")?,
            national_id: normalize_optional_text(cmd.national_id.as_deref()),
            phone: normalize_optional_text(cmd.phone.as_deref()),
        };
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, id).await?;
            self.ensure_national_id_free(&db_tx, owner.national_id.as_deref(), Some(id))
                .await?;
            owner_active_model(&owner).update(&db_tx).await?;
            Ok(owner)
        })
    }

    pub async fn owners(&self) -> ResultEngine<Vec<Owner>> {
        owners::Entity::find()
            .order_by_asc(owners::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Owner::try_from)
            .collect()
    }

    pub async fn owner(&self, id: Uuid) -> ResultEngine<Owner> {
        Owner::try_from(self.require_owner(&self.database, id).await?)
    }

    /// Deletes an owner. Units and garages are detached; movements paying
    /// the owner block the deletion.
    pub async fn delete_owner(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_privileged("delete owners")?;
        with_tx!(self, |db_tx| {
            let owner = self.require_owner(&db_tx, id).await?;
            let in_use = movements::Entity::find()
                .filter(movements::Column::OwnerId.eq(owner.id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(EngineError::InUse(format!(
                    "owner '{}' has movements",
                    owner.name
                )));
            }
            owners::Entity::delete_by_id(owner.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn ensure_national_id_free<C: ConnectionTrait>(
        &self,
        db: &C,
        national_id: Option<&str>,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let Some(national_id) = national_id else {
            return Ok(());
        };
        let mut query =
            owners::Entity::find().filter(owners::Column::NationalId.eq(national_id.to_string()));
        if let Some(except) = except {
            query = query.filter(owners::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(national_id.to_string()));
        }
        Ok(())
    }

    // ── Booking states ───────────────────────────────────────────────────

    pub async fn booking_states(&self) -> ResultEngine<Vec<BookingState>> {
        Ok(booking_states::Entity::find()
            .order_by_asc(booking_states::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BookingState::from)
            .collect())
    }

    pub async fn create_booking_state(
        &self,
        actor: &Actor,
        id: &str,
        name: &str,
    ) -> ResultEngine<BookingState> {
        actor.require_privileged("create booking states")?;
        let state = BookingState {
            id: normalize_catalog_id(id, "state")?,
            name: normalize_required_name(name, "state")?,
        };
        with_tx!(self, |db_tx| {
            if booking_states::Entity::find_by_id(state.id.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(state.id));
            }
            booking_states::ActiveModel {
                id: ActiveValue::Set(state.id.clone()),
                name: ActiveValue::Set(state.name.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok(state)
        })
    }

    pub async fn delete_booking_state(&self, actor: &Actor, id: &str) -> ResultEngine<()> {
        actor.require_privileged("delete booking states")?;
        let id = normalize_catalog_id(id, "state")?;
        if id == crate::DEFAULT_STATE {
            return Err(EngineError::InUse(format!(
                "'{id}' is the default booking state"
            )));
        }
        with_tx!(self, |db_tx| {
            if booking_states::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("booking state {id}")));
            }
            let in_use = bookings::Entity::find()
                .filter(bookings::Column::StateId.eq(id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(EngineError::InUse(format!("booking state '{id}' is used")));
            }
            booking_states::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    // ── Movement types ───────────────────────────────────────────────────

    pub async fn movement_types(&self) -> ResultEngine<Vec<MovementType>> {
        Ok(movement_types::Entity::find()
            .order_by_asc(movement_types::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(MovementType::from)
            .collect())
    }

    pub async fn create_movement_type(
        &self,
        actor: &Actor,
        id: &str,
        name: &str,
        requires_owner: bool,
    ) -> ResultEngine<MovementType> {
        actor.require_privileged("create movement types")?;
        let kind = MovementType {
            id: normalize_catalog_id(id, "movement type")?,
            name: normalize_required_name(name, "movement type")?,
            requires_owner,
        };
        with_tx!(self, |db_tx| {
            if movement_types::Entity::find_by_id(kind.id.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(kind.id));
            }
            movement_types::ActiveModel {
                id: ActiveValue::Set(kind.id.clone()),
                name: ActiveValue::Set(kind.name.clone()),
                requires_owner: ActiveValue::Set(kind.requires_owner),
            }
            .insert(&db_tx)
            .await?;
            Ok(kind)
        })
    }

    pub async fn delete_movement_type(&self, actor: &Actor, id: &str) -> ResultEngine<()> {
        actor.require_privileged("delete movement types")?;
        let id = normalize_catalog_id(id, "movement type")?;
        with_tx!(self, |db_tx| {
            if movement_types::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound(format!("movement type {id}")));
            }
            let in_use = movements::Entity::find()
                .filter(movements::Column::TypeId.eq(id.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if in_use {
                return Err(EngineError::InUse(format!("movement type '{id}' is used")));
            }
            movement_types::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

pub(super) fn normalize_state_id(value: &str) -> ResultEngine<String> {
    normalize_catalog_id(value, "state")
}

pub(super) fn normalize_type_id(value: &str) -> ResultEngine<String> {
    normalize_catalog_id(value, "movement type")
}

async fn find_unit_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> ResultEngine<Option<units::Model>> {
    Ok(units::Entity::find()
        .filter(units::Column::Code.eq(code.to_string()))
        .one(db)
        .await?)
}

async fn find_garage_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> ResultEngine<Option<garages::Model>> {
    Ok(garages::Entity::find()
        .filter(garages::Column::Code.eq(code.to_string()))
        .one(db)
        .await?)
}

fn owner_active_model(owner: &Owner) -> owners::ActiveModel {
    owners::ActiveModel {
        id: ActiveValue::Set(owner.id.to_string()),
        name: ActiveValue::Set(owner.name.clone()),
        national_id: ActiveValue::Set(owner.national_id.clone()),
        phone: ActiveValue::Set(owner.phone.clone()),
    }
}
