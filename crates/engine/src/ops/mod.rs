use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ResultEngine;

mod access;
mod bookings;
mod catalog;
mod movements;
mod notes;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// How the "no overlapping bookings per unit" rule is enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapCheck {
    /// The store rejects overlapping rows itself (SQLite triggers or a
    /// PostgreSQL exclusion constraint).
    Storage,
    /// The engine checks for overlaps and writes inside one transaction while
    /// holding its booking write lock.
    Serialized,
}

/// Whether the resolver may create unknown codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    Existing,
    CreateMissing,
}

/// Booking listing filters. All set filters must match.
#[derive(Clone, Debug, Default)]
pub struct BookingListFilter {
    /// Bookings ending on or after this date.
    pub from: Option<NaiveDate>,
    /// Bookings starting on or before this date.
    pub to: Option<NaiveDate>,
    pub state: Option<String>,
    pub unit_code: Option<String>,
    /// `Some(true)`: only bookings that ended before today.
    /// `Some(false)`: only current and future ones.
    pub past: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct MovementListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub type_id: Option<String>,
    pub owner_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    overlap_check: OverlapCheck,
    /// Serializes booking writes inside this engine.
    booking_writes: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn overlap_check(&self) -> OverlapCheck {
        self.overlap_check
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    overlap_check: Option<OverlapCheck>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Force an overlap enforcement mode instead of detecting it.
    pub fn overlap_check(mut self, mode: OverlapCheck) -> EngineBuilder {
        self.overlap_check = Some(mode);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let overlap_check = match self.overlap_check {
            Some(mode) => mode,
            None => detect_overlap_check(&self.database).await?,
        };
        tracing::info!(?overlap_check, "booking overlap enforcement selected");
        Ok(Engine {
            database: self.database,
            overlap_check,
            booking_writes: Mutex::new(()),
        })
    }
}

/// Looks for the storage-level overlap constraint installed by the
/// migrations.
async fn detect_overlap_check(db: &DatabaseConnection) -> ResultEngine<OverlapCheck> {
    let backend = db.get_database_backend();
    let (sql, expected) = match backend {
        DbBackend::Sqlite => (
            "SELECT COUNT(*) AS n FROM sqlite_master \
             WHERE type = 'trigger' AND name LIKE 'bookings_no_overlap%'",
            2,
        ),
        DbBackend::Postgres => (
            "SELECT COUNT(*) AS n FROM pg_constraint WHERE conname = 'bookings_no_overlap'",
            1,
        ),
        _ => return Ok(OverlapCheck::Serialized),
    };
    let found: i64 = match db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?
    {
        Some(row) => row.try_get("", "n")?,
        None => 0,
    };
    if found >= expected {
        Ok(OverlapCheck::Storage)
    } else {
        Ok(OverlapCheck::Serialized)
    }
}

/// Today's calendar date, used for "past" bookings and default movement dates.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
