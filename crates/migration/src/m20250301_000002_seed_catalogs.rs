//! Seeds the booking state and movement type catalogs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

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

const STATES: [(&str, &str); 2] = [("active", "Active"), ("closed", "Closed")];

const MOVEMENT_TYPES: [(&str, &str, bool); 6] = [
    ("tenant", "Tenant", false),
    ("owner", "Owner payout", true),
    ("cleaning", "Cleaning", true),
    ("reception", "Reception", true),
    ("commission", "Commission", false),
    ("advertising", "Advertising", true),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut states = Query::insert();
        states
            .into_table(BookingStates::Table)
            .columns([BookingStates::Id, BookingStates::Name])
            .on_conflict(
                OnConflict::column(BookingStates::Id)
                    .do_nothing()
                    .to_owned(),
            );
        for (id, name) in STATES {
            states.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(states).await?;

        let mut types = Query::insert();
        types
            .into_table(MovementTypes::Table)
            .columns([
                MovementTypes::Id,
                MovementTypes::Name,
                MovementTypes::RequiresOwner,
            ])
            .on_conflict(
                OnConflict::column(MovementTypes::Id)
                    .do_nothing()
                    .to_owned(),
            );
        for (id, name, requires_owner) in MOVEMENT_TYPES {
            types.values_panic([id.into(), name.into(), requires_owner.into()]);
        }
        manager.exec_stmt(types).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(MovementTypes::Table)
                    .and_where(
                        Expr::col(MovementTypes::Id)
                            .is_in(MOVEMENT_TYPES.iter().map(|(id, _, _)| *id)),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(BookingStates::Table)
                    .and_where(Expr::col(BookingStates::Id).is_in(STATES.iter().map(|(id, _)| *id)))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
