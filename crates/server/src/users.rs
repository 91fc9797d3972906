//! User management, superusers only.

use api_types::user::{UserNew, UserUpdate, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Actor, NewUser};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{role_from_wire, user_view},
    extract::{JsonBody, PathParam},
    server::ServerState,
};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.users(&actor).await?;
    Ok(Json(users.into_iter().map(user_view).collect()))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .create_user(
            &actor,
            NewUser::new(
                payload.name,
                payload.email,
                payload.password,
                role_from_wire(payload.role),
            ),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(user_view(state.engine.user(&actor, id).await?)))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let update = engine::UserUpdate {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        role: payload.role.map(role_from_wire),
    };
    let user = state.engine.update_user(&actor, id, update).await?;
    Ok(Json(user_view(user)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
