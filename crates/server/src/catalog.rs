//! Reference data endpoints: units, garages, owners, booking states and
//! movement types.

use api_types::catalog::{
    CodeNew, CodeView, MovementTypeNew, MovementTypeView, OwnerInput, OwnerView, ResolveRequest,
    ResolvedId, StateNew, StateView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Actor, NewOwner, ResolveMode};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{garage_view, movement_type_view, owner_view, state_view, unit_view},
    extract::{JsonBody, PathParam},
    server::ServerState,
};

fn resolve_mode(create_missing: bool) -> ResolveMode {
    if create_missing {
        ResolveMode::CreateMissing
    } else {
        ResolveMode::Existing
    }
}

pub async fn unit_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<CodeNew>,
) -> Result<(StatusCode, Json<CodeView>), ServerError> {
    let unit = state.engine.create_unit(&payload.code, payload.owner_id).await?;
    Ok((StatusCode::CREATED, Json(unit_view(unit))))
}

pub async fn units(State(state): State<ServerState>) -> Result<Json<Vec<CodeView>>, ServerError> {
    let units = state.engine.units().await?;
    Ok(Json(units.into_iter().map(unit_view).collect()))
}

pub async fn unit_get(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<CodeView>, ServerError> {
    Ok(Json(unit_view(state.engine.unit(id).await?)))
}

pub async fn unit_delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_unit(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Find-or-create a unit by code.
pub async fn unit_resolve(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<ResolveRequest>,
) -> Result<Json<ResolvedId>, ServerError> {
    let id = state
        .engine
        .resolve_unit(&payload.code, resolve_mode(payload.create_missing))
        .await?;
    Ok(Json(ResolvedId { id: Some(id) }))
}

pub async fn garage_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<CodeNew>,
) -> Result<(StatusCode, Json<CodeView>), ServerError> {
    let garage = state
        .engine
        .create_garage(&payload.code, payload.owner_id)
        .await?;
    Ok((StatusCode::CREATED, Json(garage_view(garage))))
}

pub async fn garages(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CodeView>>, ServerError> {
    let garages = state.engine.garages().await?;
    Ok(Json(garages.into_iter().map(garage_view).collect()))
}

pub async fn garage_delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_garage(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unknown garage codes resolve to `null` unless creation is requested.
pub async fn garage_resolve(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<ResolveRequest>,
) -> Result<Json<ResolvedId>, ServerError> {
    let id = state
        .engine
        .resolve_garage(Some(payload.code.as_str()), resolve_mode(payload.create_missing))
        .await?;
    Ok(Json(ResolvedId { id }))
}

fn owner_cmd(payload: OwnerInput) -> NewOwner {
    NewOwner {
        name: payload.name,
        national_id: payload.national_id,
        phone: payload.phone,
    }
}

pub async fn owner_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<OwnerInput>,
) -> Result<(StatusCode, Json<OwnerView>), ServerError> {
    let owner = state.engine.create_owner(owner_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(owner_view(owner))))
}

pub async fn owner_update(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<OwnerInput>,
) -> Result<Json<OwnerView>, ServerError> {
    let owner = state.engine.update_owner(id, owner_cmd(payload)).await?;
    Ok(Json(owner_view(owner)))
}

pub async fn owners(
    State(state): State<ServerState>,
) -> Result<Json<Vec<OwnerView>>, ServerError> {
    let owners = state.engine.owners().await?;
    Ok(Json(owners.into_iter().map(owner_view).collect()))
}

pub async fn owner_get(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<OwnerView>, ServerError> {
    Ok(Json(owner_view(state.engine.owner(id).await?)))
}

pub async fn owner_delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_owner(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn states(
    State(state): State<ServerState>,
) -> Result<Json<Vec<StateView>>, ServerError> {
    let states = state.engine.booking_states().await?;
    Ok(Json(states.into_iter().map(state_view).collect()))
}

pub async fn state_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<StateNew>,
) -> Result<(StatusCode, Json<StateView>), ServerError> {
    let created = state
        .engine
        .create_booking_state(&actor, &payload.id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(state_view(created))))
}

pub async fn state_delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_booking_state(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn movement_types(
    State(state): State<ServerState>,
) -> Result<Json<Vec<MovementTypeView>>, ServerError> {
    let kinds = state.engine.movement_types().await?;
    Ok(Json(kinds.into_iter().map(movement_type_view).collect()))
}

pub async fn movement_type_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<MovementTypeNew>,
) -> Result<(StatusCode, Json<MovementTypeView>), ServerError> {
    let kind = state
        .engine
        .create_movement_type(&actor, &payload.id, &payload.name, payload.requires_owner)
        .await?;
    Ok((StatusCode::CREATED, Json(movement_type_view(kind))))
}

pub async fn movement_type_delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_movement_type(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
