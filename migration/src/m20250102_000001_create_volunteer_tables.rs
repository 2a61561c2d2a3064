use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = table_auto(Volunteers::Table)
            .col(pk_auto(Volunteers::Id))
            .col(string_uniq(Volunteers::Email))
            .col(string_null(Volunteers::FirstName))
            .col(string_null(Volunteers::LastName))
            .col(string_null(Volunteers::Phone))
            .to_owned();
        manager.create_table(table).await?;

        let table = table_auto(VolunteerShifts::Table)
            .col(pk_auto(VolunteerShifts::Id))
            .col(double(VolunteerShifts::Hours))
            .col(timestamp(VolunteerShifts::ShiftDate))
            .col(string(VolunteerShifts::Email))
            .col(integer_null(VolunteerShifts::VolunteerId))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_shift_volunteer")
                    .from(VolunteerShifts::Table, VolunteerShifts::VolunteerId)
                    .to(Volunteers::Table, Volunteers::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shift_volunteer")
                    .table(VolunteerShifts::Table)
                    .col(VolunteerShifts::VolunteerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VolunteerShifts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Volunteers::Table).to_owned())
            .await?;

        Ok(())
    }
}
