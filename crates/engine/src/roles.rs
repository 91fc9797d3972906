//! User roles and the acting identity passed to every engine operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Role of a user.
///
/// - `operator`: day-to-day bookings, movements and notes.
/// - `admin`: also changes booking states and manages catalogs.
/// - `superuser`: also manages users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    Admin,
    Superuser,
}

impl Role {
    /// Returns the canonical role string stored in the database and in tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Admin => "admin",
            Self::Superuser => "superuser",
        }
    }

    /// Admin or superuser.
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Superuser)
    }

    pub fn is_superuser(self) -> bool {
        self == Self::Superuser
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    /// Accepts the canonical names plus the legacy Spanish ones
    /// (`normal`/`operador`, `programador`).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "operator" | "operador" | "normal" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            "superuser" | "programador" => Ok(Self::Superuser),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an operation.
///
/// Built by the HTTP layer from a verified token; the engine trusts the role
/// without re-reading the user row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub(crate) fn require_privileged(&self, action: &str) -> Result<(), EngineError> {
        if self.role.is_privileged() {
            return Ok(());
        }
        Err(EngineError::Forbidden(format!(
            "only admin or superuser can {action}"
        )))
    }

    pub(crate) fn require_superuser(&self, action: &str) -> Result<(), EngineError> {
        if self.role.is_superuser() {
            return Ok(());
        }
        Err(EngineError::Forbidden(format!("only superuser can {action}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_role_names_are_accepted() {
        assert_eq!(Role::try_from("programador").unwrap(), Role::Superuser);
        assert_eq!(Role::try_from("normal").unwrap(), Role::Operator);
        assert_eq!(Role::try_from("Admin").unwrap(), Role::Admin);
        assert!(Role::try_from("root").is_err());
    }

    #[test]
    fn operator_cannot_do_privileged_things() {
        let actor = Actor::new(Uuid::new_v4(), Role::Operator);
        assert!(matches!(
            actor.require_privileged("close bookings"),
            Err(EngineError::Forbidden(_))
        ));
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert!(admin.require_privileged("close bookings").is_ok());
        assert!(admin.require_superuser("manage users").is_err());
    }
}
