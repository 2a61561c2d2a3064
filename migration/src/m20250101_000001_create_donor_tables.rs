use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = table_auto(Donors::Table)
            .col(pk_auto(Donors::Id))
            .col(string_uniq(Donors::Email))
            .col(string_null(Donors::FirstName))
            .col(string_null(Donors::LastName))
            .col(string_null(Donors::Phone))
            .col(string_null(Donors::ExternalId))
            .col(timestamp_null(Donors::LastImported))
            .to_owned();
        manager.create_table(table).await?;

        // donor_id stays nullable: donations may be recorded before the donor exists.
        let table = table_auto(Donations::Table)
            .col(pk_auto(Donations::Id))
            .col(double(Donations::Amount))
            .col(timestamp(Donations::Timestamp))
            .col(string(Donations::Email))
            .col(integer_null(Donations::DonorId))
            .col(string_null(Donations::ExternalDonationId))
            .col(boolean(Donations::Imported).default(false))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_donation_donor")
                    .from(Donations::Table, Donations::DonorId)
                    .to(Donors::Table, Donors::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donation_donor")
                    .table(Donations::Table)
                    .col(Donations::DonorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donation_email")
                    .table(Donations::Table)
                    .col(Donations::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donation_external_id")
                    .table(Donations::Table)
                    .col(Donations::ExternalDonationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Donors::Table).to_owned())
            .await?;

        Ok(())
    }
}
