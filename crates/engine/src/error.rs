//! The module contains the error the engine can throw.
//!
//! Errors fall in a few families:
//!
//! - input problems: [`Validation`], [`InvalidAmount`], [`InvalidReference`]
//! - conflicts: [`ExistingKey`], [`Overlap`], [`InUse`]
//! - access: [`Unauthorized`], [`Forbidden`], [`KeyNotFound`]
//! - storage failures: [`Database`]
//!
//! Database errors are classified on conversion so that constraint violations
//! raised by the store surface as conflicts instead of opaque failures.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidReference`]: EngineError::InvalidReference
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Overlap`]: EngineError::Overlap
//!  [`InUse`]: EngineError::InUse
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Name of the storage-level overlap constraint (SQLite trigger message and
/// PostgreSQL exclusion constraint).
pub(crate) const OVERLAP_CONSTRAINT: &str = "bookings_no_overlap";

pub(crate) const OVERLAP_MESSAGE: &str = "the unit is already booked in that date range";

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Overlapping booking: {0}")]
    Overlap(String),
    #[error("Still in use: {0}")]
    InUse(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if err.to_string().contains(OVERLAP_CONSTRAINT) {
            return Self::Overlap(OVERLAP_MESSAGE.to_string());
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::ExistingKey("duplicate value".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::InUse("record is referenced by other records".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Overlap(a), Self::Overlap(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
