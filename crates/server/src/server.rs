use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    ServerError, auth, auth::AuthConfig, bookings, catalog, exports, movements, notes, users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AuthConfig>,
}

/// Verifies the bearer token and stores the claims and the [`engine::Actor`]
/// in the request extensions.
async fn require_token(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        tracing::warn!(path = %request.uri().path(), "request without bearer token");
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let claims = auth::verify_token(&state.auth, bearer.token())?;
    let actor = claims.actor()?;

    request.extensions_mut().insert(actor);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/me", get(auth::me))
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route(
            "/bookings/{id}",
            get(bookings::get)
                .put(bookings::update)
                .delete(bookings::delete),
        )
        .route(
            "/bookings/{id}/notes",
            get(notes::list).post(notes::create),
        )
        .route("/notes/{id}", delete(notes::delete))
        .route("/movements", get(movements::list).post(movements::create))
        .route(
            "/movements/{id}",
            get(movements::get)
                .put(movements::update)
                .delete(movements::delete),
        )
        .route("/units", get(catalog::units).post(catalog::unit_new))
        .route("/units/resolve", post(catalog::unit_resolve))
        .route(
            "/units/{id}",
            get(catalog::unit_get).delete(catalog::unit_delete),
        )
        .route("/garages", get(catalog::garages).post(catalog::garage_new))
        .route("/garages/resolve", post(catalog::garage_resolve))
        .route("/garages/{id}", delete(catalog::garage_delete))
        .route("/owners", get(catalog::owners).post(catalog::owner_new))
        .route(
            "/owners/{id}",
            get(catalog::owner_get)
                .put(catalog::owner_update)
                .delete(catalog::owner_delete),
        )
        .route("/states", get(catalog::states).post(catalog::state_new))
        .route("/states/{id}", delete(catalog::state_delete))
        .route(
            "/movement-types",
            get(catalog::movement_types).post(catalog::movement_type_new),
        )
        .route(
            "/movement-types/{id}",
            delete(catalog::movement_type_delete),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/export/bookings", get(exports::bookings_csv))
        .route("/export/movements", get(exports::movements_csv))
        .route("/export/{table}", get(exports::catalog_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .route("/login", post(auth::login))
        .with_state(state)
}

/// The full HTTP application, ready to be served or driven in tests.
pub fn app(engine: Engine, auth: AuthConfig) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth),
    })
}

pub async fn run(engine: Engine, auth: AuthConfig, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, auth, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    auth: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, auth)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    auth: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, auth, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
