//! Bearer tokens and the login/identity endpoints.
//!
//! Tokens are HS256 JWTs carrying the user id, email, name and role. The role
//! claim is trusted for authorization; nothing is stored server side.

use api_types::auth::{LoginRequest, LoginResponse, Me};
use axum::{Extension, Json, extract::State};
use chrono::{Duration, Utc};
use engine::{Actor, Role, User};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{role_to_wire, user_view},
    extract::JsonBody,
    server::ServerState,
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl: Duration,
    pub issuer: String,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, token_ttl_hours: i64, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::hours(token_ttl_hours),
            issuer: issuer.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    /// The identity the engine acts on behalf of.
    pub fn actor(&self) -> Result<Actor, ServerError> {
        let user_id = Uuid::parse_str(&self.sub)
            .map_err(|_| ServerError::Unauthorized("invalid token subject".to_string()))?;
        let role = Role::try_from(self.role.as_str())
            .map_err(|_| ServerError::Unauthorized("invalid token role".to_string()))?;
        Ok(Actor::new(user_id, role))
    }
}

pub fn issue_token(config: &AuthConfig, user: &User) -> Result<String, ServerError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.as_str().to_string(),
        exp: (now + config.token_ttl).timestamp(),
        iat: now.timestamp(),
        iss: config.issuer.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|err| {
        tracing::error!("failed to sign token: {err}");
        ServerError::Internal("failed to issue token".to_string())
    })
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, ServerError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        tracing::warn!("rejected token: {err}");
        ServerError::Unauthorized("invalid or expired token".to_string())
    })
}

pub async fn login(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = issue_token(&state.auth, &user)?;
    tracing::info!(user = %user.id, "login");

    Ok(Json(LoginResponse {
        token,
        user: user_view(user),
    }))
}

pub async fn me(Extension(claims): Extension<Claims>) -> Result<Json<Me>, ServerError> {
    let actor = claims.actor()?;
    Ok(Json(Me {
        id: actor.user_id,
        email: claims.email,
        name: claims.name,
        role: role_to_wire(actor.role),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn token_round_trip() {
        let config = AuthConfig::new("secret", 2, "estadias");
        let user = user();
        let token = issue_token(&config, &user).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.actor().unwrap(), Actor::new(user.id, Role::Admin));
    }

    #[test]
    fn token_from_other_secret_or_issuer_is_rejected() {
        let token = issue_token(&AuthConfig::new("secret", 2, "estadias"), &user()).unwrap();
        assert!(verify_token(&AuthConfig::new("other", 2, "estadias"), &token).is_err());
        assert!(verify_token(&AuthConfig::new("secret", 2, "someone"), &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::new("secret", -1, "estadias");
        let token = issue_token(&config, &user()).unwrap();
        assert!(matches!(
            verify_token(&config, &token),
            Err(ServerError::Unauthorized(_))
        ));
    }
}
