//! Storage-level no-overlap constraint for bookings.
//!
//! - SQLite: `BEFORE INSERT`/`BEFORE UPDATE` triggers aborting with
//!   `bookings_no_overlap`.
//! - PostgreSQL: `EXCLUDE USING gist` over `(unit_id, daterange)`.
//! - Other backends get nothing here; the engine falls back to its serialized
//!   check-then-write path when it cannot find the constraint.

use sea_orm::{ConnectionTrait, DbBackend};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SQLITE_INSERT_TRIGGER: &str = "\
CREATE TRIGGER IF NOT EXISTS bookings_no_overlap_insert
BEFORE INSERT ON bookings
FOR EACH ROW
WHEN EXISTS (
    SELECT 1 FROM bookings b
    WHERE b.unit_id = NEW.unit_id
      AND b.start_date <= NEW.end_date
      AND b.end_date >= NEW.start_date
)
BEGIN
    SELECT RAISE(ABORT, 'bookings_no_overlap');
END";

const SQLITE_UPDATE_TRIGGER: &str = "\
CREATE TRIGGER IF NOT EXISTS bookings_no_overlap_update
BEFORE UPDATE OF unit_id, start_date, end_date ON bookings
FOR EACH ROW
WHEN EXISTS (
    SELECT 1 FROM bookings b
    WHERE b.unit_id = NEW.unit_id
      AND b.id <> NEW.id
      AND b.start_date <= NEW.end_date
      AND b.end_date >= NEW.start_date
)
BEGIN
    SELECT RAISE(ABORT, 'bookings_no_overlap');
END";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        match manager.get_database_backend() {
            DbBackend::Sqlite => {
                db.execute_unprepared(SQLITE_INSERT_TRIGGER).await?;
                db.execute_unprepared(SQLITE_UPDATE_TRIGGER).await?;
            }
            DbBackend::Postgres => {
                db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist")
                    .await?;
                db.execute_unprepared(
                    "ALTER TABLE bookings ADD CONSTRAINT bookings_no_overlap \
                     EXCLUDE USING gist (unit_id WITH =, daterange(start_date, end_date, '[]') WITH &&)",
                )
                .await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        match manager.get_database_backend() {
            DbBackend::Sqlite => {
                db.execute_unprepared("DROP TRIGGER IF EXISTS bookings_no_overlap_insert")
                    .await?;
                db.execute_unprepared("DROP TRIGGER IF EXISTS bookings_no_overlap_update")
                    .await?;
            }
            DbBackend::Postgres => {
                db.execute_unprepared(
                    "ALTER TABLE bookings DROP CONSTRAINT IF EXISTS bookings_no_overlap",
                )
                .await?;
            }
            _ => {}
        }
        Ok(())
    }
}
