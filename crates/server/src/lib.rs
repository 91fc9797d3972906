use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorBody;
pub use auth::AuthConfig;
pub use server::{ServerState, app, run, run_with_listener, spawn_with_listener};

mod auth;
mod bookings;
mod catalog;
mod convert;
mod exports;
mod extract;
mod movements;
mod notes;
mod server;
mod users;

pub mod types {
    pub mod booking {
        pub use api_types::booking::{
            AmountPair, Amounts, BookingInput, BookingQuery, BookingView,
        };
    }

    pub mod movement {
        pub use api_types::movement::{MovementInput, MovementQuery, MovementView};
    }

    pub mod catalog {
        pub use api_types::catalog::{
            CodeNew, CodeView, MovementTypeNew, MovementTypeView, OwnerInput, OwnerView,
            ResolveRequest, ResolvedId, StateNew, StateView,
        };
    }

    pub mod user {
        pub use api_types::auth::{LoginRequest, LoginResponse, Me};
        pub use api_types::user::{Role, UserNew, UserUpdate, UserView};
    }

    pub use api_types::{Decimal, ErrorBody};
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request the engine never saw.
    Generic(String),
    Unauthorized(String),
    /// Server-side failure outside the engine. The message is logged, never
    /// sent to the caller.
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Overlap(_) | EngineError::InUse(_) => {
            StatusCode::CONFLICT
        }
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Internal(err) => {
                tracing::error!("request failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn input_errors_map_to_400() {
        assert_eq!(status(EngineError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(EngineError::InvalidAmount("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(EngineError::InvalidReference("x".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(status(EngineError::ExistingKey("x".into())), StatusCode::CONFLICT);
        assert_eq!(status(EngineError::Overlap("x".into())), StatusCode::CONFLICT);
        assert_eq!(status(EngineError::InUse("x".into())), StatusCode::CONFLICT);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            status(EngineError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(EngineError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        let res = ServerError::Unauthorized("missing token".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        assert_eq!(status(EngineError::KeyNotFound("x".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_opaque() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_failures_map_to_opaque_500() {
        let res = ServerError::Internal("failed to sign token".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
