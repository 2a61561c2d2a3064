//! Donor and donation import from spreadsheet-like exports.
//!
//! Readers turn a file into [`RawRow`]s keyed by whatever headers the export
//! used. [`ImportRow::from_raw`] resolves header variants to fields, and
//! [`import_rows`] upserts donors and records donations row by row. A failing
//! row is reported in the [`ImportResult`] and the remaining rows still run.

mod readers;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};

pub use readers::{RawRow, read_csv, read_json, read_rows, read_xlsx};

use crate::impact::parse_amount;
use crate::store::{
    StoreError,
    donors::{
        DonorInput, NewDonation, find_donation_by_external_id, insert_donation, upsert_donor,
    },
    normalize_email,
};

pub const BATCH_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported import format: {0}")]
    UnsupportedFormat(String),

    #[error("the workbook has no worksheets")]
    EmptyWorkbook,

    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    FirstName,
    LastName,
    FullName,
    Phone,
    DonorExternalId,
    Amount,
    Date,
    DonationExternalId,
}

/// Header spellings seen in CRM exports, after [`normalize_header`].
const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Email,
        &["email", "emailaddress", "primaryemail", "donoremail", "emailaddr"],
    ),
    (Field::FirstName, &["firstname", "first", "givenname", "fname"]),
    (
        Field::LastName,
        &["lastname", "last", "surname", "familyname", "lname"],
    ),
    (Field::FullName, &["name", "fullname", "donorname"]),
    (
        Field::Phone,
        &["phone", "phonenumber", "mobile", "mobilephone", "telephone"],
    ),
    (
        Field::DonorExternalId,
        &["donorid", "externalid", "constituentid", "accountid"],
    ),
    (
        Field::Amount,
        &["amount", "donationamount", "giftamount", "total", "donation"],
    ),
    (
        Field::Date,
        &["date", "donationdate", "giftdate", "timestamp", "createdat", "receiveddate"],
    ),
    (
        Field::DonationExternalId,
        &["donationid", "giftid", "transactionid", "externaldonationid"],
    ),
];

/// Lowercases a header and drops everything but letters and digits.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn field_value(raw: &RawRow, field: Field) -> Option<String> {
    let aliases = FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or_default();
    raw.iter()
        .filter(|(header, _)| aliases.contains(&normalize_header(header).as_str()))
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Accepts ISO dates and datetimes, RFC 3339 and US-style `MM/DD/YYYY`.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];

    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// A source row resolved to donor and donation fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    pub external_donation_id: Option<String>,
}

impl ImportRow {
    /// `Ok(None)` for rows without an email; they are skipped, not failed.
    pub fn from_raw(raw: &RawRow) -> Result<Option<Self>, String> {
        let Some(email) = field_value(raw, Field::Email) else {
            return Ok(None);
        };
        let email = normalize_email(&email).map_err(|e| e.to_string())?;

        let mut first_name = field_value(raw, Field::FirstName);
        let mut last_name = field_value(raw, Field::LastName);
        if first_name.is_none() && last_name.is_none() {
            if let Some(full_name) = field_value(raw, Field::FullName) {
                match full_name.split_once(' ') {
                    Some((first, last)) => {
                        first_name = Some(first.to_string());
                        last_name = Some(last.trim().to_string());
                    }
                    None => first_name = Some(full_name),
                }
            }
        }

        let amount = match field_value(raw, Field::Amount) {
            Some(text) => {
                let amount = parse_amount(&text).map_err(|e| format!("invalid amount: {e}"))?;
                if amount < 0.0 {
                    return Err(format!("invalid amount: {text} is negative"));
                }
                Some(amount)
            }
            None => None,
        };

        let timestamp = match field_value(raw, Field::Date) {
            Some(text) => {
                Some(parse_date(&text).ok_or_else(|| format!("invalid date: '{text}'"))?)
            }
            None => None,
        };

        Ok(Some(Self {
            email,
            first_name,
            last_name,
            phone: field_value(raw, Field::Phone),
            external_id: field_value(raw, Field::DonorExternalId),
            amount,
            timestamp,
            external_donation_id: field_value(raw, Field::DonationExternalId),
        }))
    }

    fn donor_input(&self) -> DonorInput {
        DonorInput {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            external_id: self.external_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub skipped_without_email: usize,
    pub donors_created: usize,
    pub donors_updated: usize,
    pub donations_created: usize,
    pub donations_already_imported: usize,
}

enum DonationOutcome {
    None,
    Created,
    AlreadyImported,
}

async fn import_row(
    db: &DatabaseConnection,
    row: &ImportRow,
    imported_at: NaiveDateTime,
) -> Result<(bool, DonationOutcome), StoreError> {
    let donor = upsert_donor(db, row.donor_input(), true).await?;

    let Some(amount) = row.amount else {
        return Ok((donor.was_created(), DonationOutcome::None));
    };
    // Only an external id identifies a donation; rows without one always insert.
    if let Some(external_id) = &row.external_donation_id {
        if find_donation_by_external_id(db, external_id).await?.is_some() {
            return Ok((donor.was_created(), DonationOutcome::AlreadyImported));
        }
    }
    insert_donation(
        db,
        NewDonation {
            email: row.email.clone(),
            amount,
            timestamp: row.timestamp.unwrap_or(imported_at),
            external_donation_id: row.external_donation_id.clone(),
            imported: true,
        },
    )
    .await?;
    Ok((donor.was_created(), DonationOutcome::Created))
}

/// Imports rows sequentially in batches of [`BATCH_SIZE`].
pub async fn import_rows(db: &DatabaseConnection, rows: Vec<RawRow>) -> ImportResult {
    let mut result = ImportResult::default();
    let imported_at = Utc::now().naive_utc();

    let mut parsed: Vec<(usize, Result<ImportRow, String>)> = Vec::new();
    for (index, raw) in rows.iter().enumerate() {
        match ImportRow::from_raw(raw) {
            Ok(Some(row)) => parsed.push((index + 1, Ok(row))),
            Ok(None) => result.skipped_without_email += 1,
            Err(e) => parsed.push((index + 1, Err(e))),
        }
    }
    result.total = parsed.len();

    for (batch_index, batch) in parsed.chunks(BATCH_SIZE).enumerate() {
        info!(
            "Importing batch {} ({} rows)",
            batch_index + 1,
            batch.len()
        );
        for (row_number, row) in batch {
            let outcome = match row {
                Ok(row) => import_row(db, row, imported_at)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.clone()),
            };
            match outcome {
                Ok((created, donation)) => {
                    result.successful += 1;
                    if created {
                        result.donors_created += 1;
                    } else {
                        result.donors_updated += 1;
                    }
                    match donation {
                        DonationOutcome::Created => result.donations_created += 1,
                        DonationOutcome::AlreadyImported => {
                            result.donations_already_imported += 1
                        }
                        DonationOutcome::None => {}
                    }
                }
                Err(e) => {
                    warn!("Import row {} failed: {}", row_number, e);
                    result.failed += 1;
                    result.errors.push(format!("Row {row_number}: {e}"));
                }
            }
        }
    }

    info!(
        "Import finished: {} total, {} successful, {} failed, {} skipped without email",
        result.total, result.successful, result.failed, result.skipped_without_email
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn headers_normalize_to_letters_and_digits() {
        assert_eq!(normalize_header("Email Address"), "emailaddress");
        assert_eq!(normalize_header("E-mail"), "email");
        assert_eq!(normalize_header("email_address"), "emailaddress");
        assert_eq!(normalize_header(" Gift Date "), "giftdate");
    }

    #[test]
    fn email_header_variants_resolve() {
        for header in ["email", "Email", "Email Address", "E-mail", "email_address"] {
            let row = ImportRow::from_raw(&raw(&[(header, "Ada@Example.org")]))
                .unwrap()
                .unwrap();
            assert_eq!(row.email, "ada@example.org", "header {header}");
        }
    }

    #[test]
    fn rows_without_email_are_skipped() {
        assert_eq!(
            ImportRow::from_raw(&raw(&[("Name", "Ada"), ("Amount", "10")])),
            Ok(None)
        );
        assert_eq!(
            ImportRow::from_raw(&raw(&[("Email", "   "), ("Amount", "10")])),
            Ok(None)
        );
    }

    #[test]
    fn full_name_splits_when_parts_missing() {
        let row = ImportRow::from_raw(&raw(&[
            ("Email", "ada@example.org"),
            ("Full Name", "Ada King Lovelace"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(row.first_name.as_deref(), Some("Ada"));
        assert_eq!(row.last_name.as_deref(), Some("King Lovelace"));
    }

    #[test]
    fn donation_fields_are_parsed() {
        let row = ImportRow::from_raw(&raw(&[
            ("Email Address", "ada@example.org"),
            ("Gift Amount", "$1,250.00"),
            ("Donation Date", "06/30/2024"),
            ("Gift ID", "G-1001"),
            ("Constituent ID", "C-77"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(row.amount, Some(1250.0));
        assert_eq!(
            row.timestamp,
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(row.external_donation_id.as_deref(), Some("G-1001"));
        assert_eq!(row.external_id.as_deref(), Some("C-77"));
    }

    #[test]
    fn bad_values_are_row_errors() {
        let bad_amount =
            ImportRow::from_raw(&raw(&[("email", "ada@example.org"), ("amount", "ten")]));
        assert!(bad_amount.unwrap_err().starts_with("invalid amount"));

        let negative =
            ImportRow::from_raw(&raw(&[("email", "ada@example.org"), ("amount", "-5")]));
        assert!(negative.is_err());

        let bad_date =
            ImportRow::from_raw(&raw(&[("email", "ada@example.org"), ("date", "someday")]));
        assert!(bad_date.unwrap_err().starts_with("invalid date"));

        let bad_email = ImportRow::from_raw(&raw(&[("email", "not an email")]));
        assert!(bad_email.is_err());
    }

    #[test]
    fn dates_accept_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for input in [
            "2024-07-01",
            "07/01/2024",
            "2024/07/01",
            "2024-07-01 00:00:00",
            "2024-07-01T00:00:00Z",
        ] {
            assert_eq!(parse_date(input), Some(expected), "input {input}");
        }
        assert_eq!(parse_date("July 1st"), None);
    }
}
