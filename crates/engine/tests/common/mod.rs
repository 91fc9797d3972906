#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Actor, BookingDraft, Engine, ExchangeRate, OverlapCheck, Role};
use migration::MigratorTrait;

pub async fn migrated_memory_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn migrated_file_db() -> (DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (db, path)
}

/// Inserts a user row directly and returns it as an actor.
pub async fn actor(db: &DatabaseConnection, role: Role) -> Actor {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email, password_hash, role) VALUES (?, ?, ?, ?, ?)",
        vec![
            id.to_string().into(),
            format!("{role} user").into(),
            format!("{id}@example.com").into(),
            "not-a-hash".into(),
            role.as_str().into(),
        ],
    ))
    .await
    .unwrap();
    Actor::new(id, role)
}

pub async fn engine(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap()
}

pub async fn engine_with(db: &DatabaseConnection, mode: OverlapCheck) -> Engine {
    Engine::builder()
        .database(db.clone())
        .overlap_check(mode)
        .build()
        .await
        .unwrap()
}

/// Removes the storage-level overlap triggers.
pub async fn drop_overlap_triggers(db: &DatabaseConnection) {
    db.execute_unprepared("DROP TRIGGER IF EXISTS bookings_no_overlap_insert")
        .await
        .unwrap();
    db.execute_unprepared("DROP TRIGGER IF EXISTS bookings_no_overlap_update")
        .await
        .unwrap();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn rate(value: &str) -> ExchangeRate {
    value.parse().unwrap()
}

pub fn booking(unit: &str, start: NaiveDate, end: NaiveDate) -> BookingDraft {
    BookingDraft::new()
        .unit_code(unit)
        .tenant("Pérez")
        .dates(start, end)
        .exchange_rate(rate("1000"))
}
