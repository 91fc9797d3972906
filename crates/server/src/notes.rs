use api_types::note::{NoteNew, NoteView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::Actor;
use uuid::Uuid;

use crate::{
    ServerError,
    convert::note_view,
    extract::{JsonBody, PathParam},
    server::ServerState,
};

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(booking_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<NoteNew>,
) -> Result<(StatusCode, Json<NoteView>), ServerError> {
    let note = state
        .engine
        .add_note(&actor, booking_id, &payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(note_view(note))))
}

pub async fn list(
    State(state): State<ServerState>,
    PathParam(booking_id): PathParam<Uuid>,
) -> Result<Json<Vec<NoteView>>, ServerError> {
    let notes = state.engine.notes(booking_id).await?;
    Ok(Json(notes.into_iter().map(note_view).collect()))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_note(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
