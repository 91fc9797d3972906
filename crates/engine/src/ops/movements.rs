use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, Movement, MovementDraft, ResultEngine, movements,
    util::{check_movement_owner, check_movement_shape, normalize_optional_text},
};

use super::{Engine, MovementListFilter, catalog::normalize_type_id, today, with_tx};

impl Engine {
    /// Records a standalone movement.
    ///
    /// Fails with `Validation` when the rate is not positive, when both
    /// amounts are missing, or when the type requires an owner and none is
    /// given.
    pub async fn create_movement(
        &self,
        actor: &Actor,
        draft: MovementDraft,
    ) -> ResultEngine<Movement> {
        with_tx!(self, |db_tx| {
            let movement = self
                .validate_movement(&db_tx, draft, Uuid::new_v4(), Some(actor.user_id))
                .await?;
            let model: movements::ActiveModel = (&movement).into();
            model.insert(&db_tx).await?;
            tracing::info!(movement = %movement.id, kind = %movement.type_id, "movement created");
            Ok(movement)
        })
    }

    pub async fn update_movement(
        &self,
        id: Uuid,
        draft: MovementDraft,
    ) -> ResultEngine<Movement> {
        with_tx!(self, |db_tx| {
            let existing = Movement::try_from(self.require_movement(&db_tx, id).await?)?;
            let movement = self
                .validate_movement(&db_tx, draft, id, existing.created_by)
                .await?;
            let model: movements::ActiveModel = (&movement).into();
            model.update(&db_tx).await?;
            Ok(movement)
        })
    }

    pub async fn delete_movement(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        actor.require_privileged("delete movements")?;
        with_tx!(self, |db_tx| {
            let movement = self.require_movement(&db_tx, id).await?;
            movements::Entity::delete_by_id(movement.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn movement(&self, id: Uuid) -> ResultEngine<Movement> {
        Movement::try_from(self.require_movement(&self.database, id).await?)
    }

    /// Lists movements by date, oldest first.
    pub async fn movements(&self, filter: &MovementListFilter) -> ResultEngine<Vec<Movement>> {
        let mut condition = Condition::all();
        if let Some(from) = filter.from {
            condition = condition.add(movements::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            condition = condition.add(movements::Column::Date.lte(to));
        }
        if let Some(type_id) = filter.type_id.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(movements::Column::TypeId.eq(normalize_type_id(type_id)?));
        }
        if let Some(owner_id) = filter.owner_id {
            condition = condition.add(movements::Column::OwnerId.eq(owner_id.to_string()));
        }
        if let Some(booking_id) = filter.booking_id {
            condition = condition.add(movements::Column::BookingId.eq(booking_id.to_string()));
        }

        movements::Entity::find()
            .filter(condition)
            .order_by_asc(movements::Column::Date)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    async fn validate_movement<C: ConnectionTrait>(
        &self,
        db: &C,
        draft: MovementDraft,
        id: Uuid,
        created_by: Option<Uuid>,
    ) -> ResultEngine<Movement> {
        let exchange_rate = check_movement_shape(&draft)?;
        let type_id = normalize_type_id(&draft.type_id)?;
        let kind = self.reference_movement_type(db, &type_id).await?;
        check_movement_owner(&kind.id, kind.requires_owner, draft.owner_id)?;
        self.reference_owner(db, draft.owner_id).await?;
        self.reference_booking(db, draft.booking_id).await?;

        Ok(Movement {
            id,
            type_id,
            amount_local: draft.amount_local,
            amount_foreign: draft.amount_foreign,
            exchange_rate,
            note: normalize_optional_text(draft.note.as_deref()),
            date: draft.date.unwrap_or_else(today),
            created_by,
            owner_id: draft.owner_id,
            booking_id: draft.booking_id,
        })
    }
}
