pub use sea_orm_migration::prelude::*;

mod m20250301_000001_init;
mod m20250301_000002_seed_catalogs;
mod m20250301_000003_booking_overlap;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_init::Migration),
            Box::new(m20250301_000002_seed_catalogs::Migration),
            Box::new(m20250301_000003_booking_overlap::Migration),
        ]
    }
}
