//! Initial schema migration.
//!
//! Creates the complete schema for Estadías:
//!
//! - `users`: authentication and roles
//! - `owners`: parties owning units and garages
//! - `units`: rentable apartments, looked up by code
//! - `garages`: optional parking attached to bookings
//! - `booking_states`: extensible booking state catalog
//! - `movement_types`: extensible movement category catalog
//! - `bookings`: stays with their derived ledger
//! - `movements`: standalone ledger lines
//! - `notes`: free-text comments attached to bookings

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
}

#[derive(Iden)]
enum Owners {
    Table,
    Id,
    Name,
    NationalId,
    Phone,
}

#[derive(Iden)]
enum Units {
    Table,
    Id,
    Code,
    OwnerId,
}

#[derive(Iden)]
enum Garages {
    Table,
    Id,
    Code,
    OwnerId,
}

#[derive(Iden)]
enum BookingStates {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum MovementTypes {
    Table,
    Id,
    Name,
    RequiresOwner,
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    UnitId,
    GarageId,
    Tenant,
    StartDate,
    EndDate,
    StateId,
    ExchangeRate,
    Note,
    CreatedBy,
    CreatedAt,
    TotalLocal,
    TotalForeign,
    TenantLocal,
    TenantForeign,
    OwnerLocal,
    OwnerForeign,
    CleaningLocal,
    CleaningForeign,
    ReceptionLocal,
    ReceptionForeign,
    CommissionLocal,
    CommissionForeign,
    AdvertisingLocal,
    AdvertisingForeign,
}

#[derive(Iden)]
enum Movements {
    Table,
    Id,
    TypeId,
    AmountLocal,
    AmountForeign,
    ExchangeRate,
    Note,
    Date,
    CreatedBy,
    OwnerId,
    BookingId,
}

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    BookingId,
    Comment,
    Date,
    CreatedBy,
}

/// Nullable money column stored as integer hundredths.
fn amount(col: Bookings) -> ColumnDef {
    ColumnDef::new(col).big_integer().to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("operator"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Owners
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Owners::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Owners::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Owners::Name).string().not_null())
                    .col(ColumnDef::new(Owners::NationalId).string().unique_key())
                    .col(ColumnDef::new(Owners::Phone).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Units and garages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Units::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Units::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Units::OwnerId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-units-owner_id")
                            .from(Units::Table, Units::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Garages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Garages::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Garages::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Garages::OwnerId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-garages-owner_id")
                            .from(Garages::Table, Garages::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Catalogs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BookingStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingStates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookingStates::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovementTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MovementTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MovementTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(MovementTypes::RequiresOwner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Bookings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::UnitId).string().not_null())
                    .col(ColumnDef::new(Bookings::GarageId).string())
                    .col(ColumnDef::new(Bookings::Tenant).string().not_null())
                    .col(ColumnDef::new(Bookings::StartDate).date().not_null())
                    .col(ColumnDef::new(Bookings::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Bookings::StateId)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Bookings::ExchangeRate)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Bookings::ExchangeRate).gt(0)),
                    )
                    .col(ColumnDef::new(Bookings::Note).text())
                    .col(ColumnDef::new(Bookings::CreatedBy).string())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::TotalLocal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bookings::TotalForeign)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(amount(Bookings::TenantLocal))
                    .col(amount(Bookings::TenantForeign))
                    .col(amount(Bookings::OwnerLocal))
                    .col(amount(Bookings::OwnerForeign))
                    .col(amount(Bookings::CleaningLocal))
                    .col(amount(Bookings::CleaningForeign))
                    .col(amount(Bookings::ReceptionLocal))
                    .col(amount(Bookings::ReceptionForeign))
                    .col(amount(Bookings::CommissionLocal))
                    .col(amount(Bookings::CommissionForeign))
                    .col(amount(Bookings::AdvertisingLocal))
                    .col(amount(Bookings::AdvertisingForeign))
                    .check(Expr::col(Bookings::StartDate).lte(Expr::col(Bookings::EndDate)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-unit_id")
                            .from(Bookings::Table, Bookings::UnitId)
                            .to(Units::Table, Units::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-garage_id")
                            .from(Bookings::Table, Bookings::GarageId)
                            .to(Garages::Table, Garages::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-state_id")
                            .from(Bookings::Table, Bookings::StateId)
                            .to(BookingStates::Table, BookingStates::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-created_by")
                            .from(Bookings::Table, Bookings::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-unit_id-start_date")
                    .table(Bookings::Table)
                    .col(Bookings::UnitId)
                    .col(Bookings::StartDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Movements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movements::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Movements::TypeId).string().not_null())
                    .col(ColumnDef::new(Movements::AmountLocal).big_integer())
                    .col(ColumnDef::new(Movements::AmountForeign).big_integer())
                    .col(
                        ColumnDef::new(Movements::ExchangeRate)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Movements::ExchangeRate).gt(0)),
                    )
                    .col(ColumnDef::new(Movements::Note).text())
                    .col(ColumnDef::new(Movements::Date).date().not_null())
                    .col(ColumnDef::new(Movements::CreatedBy).string())
                    .col(ColumnDef::new(Movements::OwnerId).string())
                    .col(ColumnDef::new(Movements::BookingId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-type_id")
                            .from(Movements::Table, Movements::TypeId)
                            .to(MovementTypes::Table, MovementTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-owner_id")
                            .from(Movements::Table, Movements::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-booking_id")
                            .from(Movements::Table, Movements::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-created_by")
                            .from(Movements::Table, Movements::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-date")
                    .table(Movements::Table)
                    .col(Movements::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Notes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Notes::BookingId).string().not_null())
                    .col(ColumnDef::new(Notes::Comment).text().not_null())
                    .col(ColumnDef::new(Notes::Date).date().not_null())
                    .col(ColumnDef::new(Notes::CreatedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notes-booking_id")
                            .from(Notes::Table, Notes::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notes-created_by")
                            .from(Notes::Table, Notes::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovementTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingStates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Garages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Owners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
