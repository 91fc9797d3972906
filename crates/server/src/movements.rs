//! Movements API endpoints.

use api_types::movement::{MovementInput, MovementQuery, MovementView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Actor, MovementDraft, MovementListFilter};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{movement_type_from_wire, movement_view, optional_money, rate},
    extract::{JsonBody, PathParam, QueryParams},
    server::ServerState,
};

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<MovementInput>,
) -> Result<(StatusCode, Json<MovementView>), ServerError> {
    let movement = state
        .engine
        .create_movement(&actor, draft_from_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(movement_view(movement))))
}

pub async fn update(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<MovementInput>,
) -> Result<Json<MovementView>, ServerError> {
    let movement = state
        .engine
        .update_movement(id, draft_from_input(payload)?)
        .await?;
    Ok(Json(movement_view(movement)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_movement(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<MovementView>, ServerError> {
    Ok(Json(movement_view(state.engine.movement(id).await?)))
}

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<MovementQuery>,
) -> Result<Json<Vec<MovementView>>, ServerError> {
    let movements = state.engine.movements(&list_filter(query)).await?;
    Ok(Json(movements.into_iter().map(movement_view).collect()))
}

pub(crate) fn list_filter(query: MovementQuery) -> MovementListFilter {
    MovementListFilter {
        from: query.from,
        to: query.to,
        type_id: query.type_id.map(movement_type_from_wire),
        owner_id: query.owner_id,
        booking_id: query.booking_id,
    }
}

pub(crate) fn draft_from_input(input: MovementInput) -> Result<MovementDraft, ServerError> {
    Ok(MovementDraft {
        type_id: movement_type_from_wire(input.type_id),
        amount_local: optional_money(input.amount_local.as_ref())?,
        amount_foreign: optional_money(input.amount_foreign.as_ref())?,
        exchange_rate: input.exchange_rate.as_ref().map(rate).transpose()?,
        note: input.note,
        date: input.date,
        owner_id: input.owner_id,
        booking_id: input.booking_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::MoneyCents;

    #[test]
    fn legacy_movement_payload() {
        let input: MovementInput = serde_json::from_str(
            r#"{"cod_tipo":"Prop","importe_ars":500,"cotizacion":1000,"concepto":"pago marzo"}"#,
        )
        .unwrap();
        let draft = draft_from_input(input).unwrap();

        assert_eq!(draft.type_id, "owner");
        assert_eq!(draft.note.as_deref(), Some("pago marzo"));
        assert_eq!(draft.amount_local, Some(MoneyCents::new(50_000)));
        assert_eq!(draft.amount_foreign, None);
        assert_eq!(draft.exchange_rate.map(|r| r.hundredths()), Some(100_000));
    }

    #[test]
    fn canonical_type_passes_through() {
        let input: MovementInput =
            serde_json::from_str(r#"{"type_id":"cleaning","amount_foreign":"12.5"}"#).unwrap();
        let draft = draft_from_input(input).unwrap();
        assert_eq!(draft.type_id, "cleaning");
        assert_eq!(draft.amount_foreign, Some(MoneyCents::new(1_250)));

        let filter = list_filter(MovementQuery {
            type_id: Some("Limp".to_string()),
            ..MovementQuery::default()
        });
        assert_eq!(filter.type_id.as_deref(), Some("cleaning"));
    }
}
