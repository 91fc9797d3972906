//! Existence checks shared by the operation modules.
//!
//! `require_*` helpers fail with `KeyNotFound` (the addressed entity is
//! missing); `reference_*` helpers fail with `InvalidReference` (a draft
//! points at something that does not exist).

use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, bookings,
    catalog::{booking_states, garages, movement_types, owners, units},
    movements, notes, users,
};

use super::Engine;

/// Generates a `require_*` lookup by primary key for an entity.
macro_rules! impl_require {
    ($fn_name:ident, $module:ident, $label:literal) => {
        pub(super) async fn $fn_name<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("{} {id}", $label)))
        }
    };
}

/// Turns a missing-entity error into a dangling-reference error.
pub(super) fn as_reference(err: EngineError) -> EngineError {
    match err {
        EngineError::KeyNotFound(what) => EngineError::InvalidReference(format!("unknown {what}")),
        other => other,
    }
}

impl Engine {
    impl_require!(require_booking, bookings, "booking");
    impl_require!(require_movement, movements, "movement");
    impl_require!(require_note, notes, "note");
    impl_require!(require_owner, owners, "owner");
    impl_require!(require_unit, units, "unit");
    impl_require!(require_garage, garages, "garage");
    impl_require!(require_user, users, "user");

    pub(super) async fn reference_owner<C: ConnectionTrait>(
        &self,
        db: &C,
        owner_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        let Some(owner_id) = owner_id else {
            return Ok(());
        };
        self.require_owner(db, owner_id)
            .await
            .map(|_| ())
            .map_err(as_reference)
    }

    pub(super) async fn reference_state<C: ConnectionTrait>(
        &self,
        db: &C,
        state_id: &str,
    ) -> ResultEngine<booking_states::Model> {
        booking_states::Entity::find_by_id(state_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidReference(format!("unknown booking state '{state_id}'"))
            })
    }

    pub(super) async fn reference_movement_type<C: ConnectionTrait>(
        &self,
        db: &C,
        type_id: &str,
    ) -> ResultEngine<movement_types::Model> {
        movement_types::Entity::find_by_id(type_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidReference(format!("unknown movement type '{type_id}'"))
            })
    }

    pub(super) async fn reference_booking<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        let Some(booking_id) = booking_id else {
            return Ok(());
        };
        self.require_booking(db, booking_id)
            .await
            .map(|_| ())
            .map_err(as_reference)
    }
}
