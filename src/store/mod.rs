//! Lookups, upserts and read-time aggregations over donors and volunteers.

pub mod donors;
pub mod segments;
pub mod volunteers;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Seaorm(#[from] sea_orm::DbErr),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Trims and lowercases an email, rejecting anything without a local part and a domain.
pub fn normalize_email(raw: &str) -> Result<String, StoreError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(StoreError::InvalidEmail(raw.trim().to_string())),
    }
}

/// A donor or volunteer may be addressed by numeric id or by email.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Id(i32),
    Email(String),
}

impl Identifier {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i32>() {
            Ok(id) => Identifier::Id(id),
            Err(_) => Identifier::Email(raw.to_lowercase()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
