use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Donors {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Phone,
    ExternalId,
    LastImported,
}

#[derive(DeriveIden)]
pub enum Donations {
    Table,
    Id,
    Amount,
    Timestamp,
    Email,
    DonorId,
    ExternalDonationId,
    Imported,
}

#[derive(DeriveIden)]
pub enum Volunteers {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Phone,
}

#[derive(DeriveIden)]
pub enum VolunteerShifts {
    Table,
    Id,
    Hours,
    ShiftDate,
    Email,
    VolunteerId,
}
