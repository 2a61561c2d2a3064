use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::NumberInput;
use crate::{
    entities::donation,
    error::AppError,
    impact::{DonationImpact, calculate_donation_impact},
    import::parse_date,
    router::AppState,
    store::{
        Identifier,
        donors::{DonorHistory, DonorInput, NewDonation, donor_history, insert_donation, upsert_donor},
    },
};

#[derive(Serialize)]
pub struct DonorResponse {
    #[serde(flatten)]
    pub history: DonorHistory,
    pub impact: DonationImpact,
}

pub async fn get_donor(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<DonorResponse>, AppError> {
    let today = Utc::now().date_naive();
    let history = donor_history(&state.db, &Identifier::parse(&identifier), today)
        .await?
        .ok_or_else(|| AppError::NotFound("Donor not found".to_string()))?;
    let impact = calculate_donation_impact(history.total_donated, &state.constants)?;
    Ok(Json(DonorResponse { history, impact }))
}

#[derive(Deserialize)]
pub struct DonationRequest {
    pub email: String,
    pub amount: NumberInput,
    pub date: Option<String>,
    pub external_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
pub struct DonationResponse {
    pub donation: donation::Model,
    pub impact: DonationImpact,
}

/// Records a donation, creating the donor on their first gift.
pub async fn record_donation(
    State(state): State<AppState>,
    Json(request): Json<DonationRequest>,
) -> Result<Json<DonationResponse>, AppError> {
    let amount = request.amount.value()?;
    let impact = calculate_donation_impact(amount, &state.constants)?;
    let timestamp = match request.date.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => parse_date(text)
            .ok_or_else(|| AppError::Validation(format!("invalid date: '{text}'")))?,
        _ => Utc::now().naive_utc(),
    };

    upsert_donor(
        &state.db,
        DonorInput {
            email: request.email.clone(),
            first_name: request.first_name,
            last_name: request.last_name,
            ..Default::default()
        },
        false,
    )
    .await?;

    let donation = insert_donation(
        &state.db,
        NewDonation {
            email: request.email,
            amount,
            timestamp,
            external_donation_id: request.external_id,
            imported: false,
        },
    )
    .await?;

    tracing::info!(
        "Recorded donation {} of {:.2} for {}",
        donation.id,
        donation.amount,
        donation.email
    );
    Ok(Json(DonationResponse { donation, impact }))
}
