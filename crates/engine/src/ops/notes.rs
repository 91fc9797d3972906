use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Actor, EngineError, Note, ResultEngine, notes, util::parse_uuid};

use super::{Engine, today, with_tx};

impl Engine {
    /// Attaches a comment to a booking, dated today.
    pub async fn add_note(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        comment: &str,
    ) -> ResultEngine<Note> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(EngineError::Validation(
                "note comment must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_booking(&db_tx, booking_id).await?;
            let note = Note {
                id: Uuid::new_v4(),
                booking_id,
                comment: comment.to_string(),
                date: today(),
                created_by: Some(actor.user_id),
            };
            let model: notes::ActiveModel = (&note).into();
            model.insert(&db_tx).await?;
            Ok(note)
        })
    }

    /// Notes of a booking, oldest first.
    pub async fn notes(&self, booking_id: Uuid) -> ResultEngine<Vec<Note>> {
        self.require_booking(&self.database, booking_id).await?;
        notes::Entity::find()
            .filter(notes::Column::BookingId.eq(booking_id.to_string()))
            .order_by_asc(notes::Column::Date)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Note::try_from)
            .collect()
    }

    /// Only the author or a privileged user may delete a note.
    pub async fn delete_note(&self, actor: &Actor, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let note = self.require_note(&db_tx, id).await?;
            let author = match note.created_by.as_deref() {
                Some(author) => Some(parse_uuid(author, "user")?),
                None => None,
            };
            if author != Some(actor.user_id) {
                actor.require_privileged("delete notes of other users")?;
            }
            notes::Entity::delete_by_id(note.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
