use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::debug;

use super::{Identifier, StoreError, non_empty, normalize_email};
use crate::entities::{donation, donor, prelude::*};
use crate::impact::fiscal::{
    FiscalYear, FiscalYearSummary, summarize_by_fiscal_year, total_for_fiscal_year,
};
use crate::slides::DonorContext;

#[derive(Debug, Clone, Default)]
pub struct DonorInput {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub email: String,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
    pub external_donation_id: Option<String>,
    pub imported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Upserted<T> {
    Created(T),
    Updated(T),
}

impl<T> Upserted<T> {
    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(model) | Upserted::Updated(model) => model,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }
}

pub async fn find_donor_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<donor::Model>, StoreError> {
    let email = email.trim().to_lowercase();
    Ok(Donor::find()
        .filter(donor::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_donor_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<donor::Model>, StoreError> {
    Ok(Donor::find_by_id(id).one(db).await?)
}

pub async fn find_donor_by_external_id(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<Option<donor::Model>, StoreError> {
    Ok(Donor::find()
        .filter(donor::Column::ExternalId.eq(external_id.trim()))
        .one(db)
        .await?)
}

/// Numeric identifiers match the donor id first, then the CRM external id.
pub async fn find_donor(
    db: &DatabaseConnection,
    identifier: &Identifier,
) -> Result<Option<donor::Model>, StoreError> {
    match identifier {
        Identifier::Id(id) => match find_donor_by_id(db, *id).await? {
            Some(found) => Ok(Some(found)),
            None => find_donor_by_external_id(db, &id.to_string()).await,
        },
        Identifier::Email(email) => find_donor_by_email(db, email).await,
    }
}

/// Inserts a donor or updates the one already holding this email.
///
/// Only non-empty fields overwrite stored values. `imported` stamps `last_imported`.
pub async fn upsert_donor(
    db: &DatabaseConnection,
    input: DonorInput,
    imported: bool,
) -> Result<Upserted<donor::Model>, StoreError> {
    let email = normalize_email(&input.email)?;
    let now = Utc::now().naive_utc();
    let first_name = non_empty(input.first_name);
    let last_name = non_empty(input.last_name);
    let phone = non_empty(input.phone);
    let external_id = non_empty(input.external_id);

    match find_donor_by_email(db, &email).await? {
        Some(existing) => {
            let mut model: donor::ActiveModel = existing.into();
            if first_name.is_some() {
                model.first_name = Set(first_name);
            }
            if last_name.is_some() {
                model.last_name = Set(last_name);
            }
            if phone.is_some() {
                model.phone = Set(phone);
            }
            if external_id.is_some() {
                model.external_id = Set(external_id);
            }
            if imported {
                model.last_imported = Set(Some(now));
            }
            model.updated_at = Set(now);
            let updated = model.update(db).await?;
            debug!("Updated donor {} ({})", updated.id, updated.email);
            Ok(Upserted::Updated(updated))
        }
        None => {
            let model = donor::ActiveModel {
                email: Set(email),
                first_name: Set(first_name),
                last_name: Set(last_name),
                phone: Set(phone),
                external_id: Set(external_id),
                last_imported: Set(imported.then_some(now)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let created = model.insert(db).await?;
            debug!("Created donor {} ({})", created.id, created.email);
            Ok(Upserted::Created(created))
        }
    }
}

/// Records a donation, linking it to a donor when one holds the email.
pub async fn insert_donation(
    db: &DatabaseConnection,
    new: NewDonation,
) -> Result<donation::Model, StoreError> {
    let email = normalize_email(&new.email)?;
    let donor_id = find_donor_by_email(db, &email).await?.map(|d| d.id);
    let now = Utc::now().naive_utc();

    let model = donation::ActiveModel {
        amount: Set(new.amount),
        timestamp: Set(new.timestamp),
        email: Set(email),
        donor_id: Set(donor_id),
        external_donation_id: Set(non_empty(new.external_donation_id)),
        imported: Set(new.imported),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    if created.donor_id.is_none() {
        debug!("Donation {} recorded without a donor for {}", created.id, created.email);
    }
    Ok(created)
}

pub async fn find_donation_by_external_id(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<Option<donation::Model>, StoreError> {
    Ok(Donation::find()
        .filter(donation::Column::ExternalDonationId.eq(external_id.trim()))
        .one(db)
        .await?)
}

/// Donations for one donor, newest first.
pub async fn donations_for_donor(
    db: &DatabaseConnection,
    donor_id: i32,
) -> Result<Vec<donation::Model>, StoreError> {
    Ok(Donation::find()
        .filter(donation::Column::DonorId.eq(donor_id))
        .order_by_desc(donation::Column::Timestamp)
        .order_by_desc(donation::Column::Id)
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct DonorHistory {
    pub donor: donor::Model,
    pub donations: Vec<donation::Model>,
    pub total_donated: f64,
    pub fiscal_years: Vec<FiscalYearSummary>,
    pub current_fiscal_year: FiscalYear,
    pub current_fiscal_year_total: f64,
}

impl DonorHistory {
    pub fn build(donor: donor::Model, donations: Vec<donation::Model>, today: NaiveDate) -> Self {
        let total: f64 = donations.iter().map(|d| d.amount).sum();
        let current_fiscal_year = FiscalYear::containing(today);
        Self {
            fiscal_years: summarize_by_fiscal_year(&donations),
            current_fiscal_year_total: total_for_fiscal_year(&donations, current_fiscal_year),
            current_fiscal_year,
            total_donated: (total * 100.0).round() / 100.0,
            donor,
            donations,
        }
    }

    pub fn context(&self) -> DonorContext {
        DonorContext {
            name: self.donor.display_name(),
            email: self.donor.email.clone(),
            lifetime_total: self.total_donated,
            gift_count: self.donations.len(),
            fiscal_years: self.fiscal_years.clone(),
        }
    }
}

pub async fn donor_history(
    db: &DatabaseConnection,
    identifier: &Identifier,
    today: NaiveDate,
) -> Result<Option<DonorHistory>, StoreError> {
    let Some(donor) = find_donor(db, identifier).await? else {
        return Ok(None);
    };
    let donations = donations_for_donor(db, donor.id).await?;
    Ok(Some(DonorHistory::build(donor, donations, today)))
}
