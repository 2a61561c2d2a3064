use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::{NumberInput, required};
use crate::{
    error::AppError,
    impact::{DonationImpact, VolunteerImpact, calculate_donation_impact, calculate_volunteer_impact},
    router::AppState,
};

#[derive(Deserialize)]
pub struct AmountQuery {
    pub amount: Option<String>,
}

#[derive(Deserialize)]
pub struct AmountBody {
    pub amount: NumberInput,
}

#[derive(Deserialize)]
pub struct HoursQuery {
    pub hours: Option<String>,
}

#[derive(Deserialize)]
pub struct HoursBody {
    pub hours: NumberInput,
}

pub async fn calculate_impact_query(
    State(state): State<AppState>,
    Query(query): Query<AmountQuery>,
) -> Result<Json<DonationImpact>, AppError> {
    let amount = required(query.amount, "amount")?;
    Ok(Json(calculate_donation_impact(amount, &state.constants)?))
}

pub async fn calculate_impact_body(
    State(state): State<AppState>,
    Json(body): Json<AmountBody>,
) -> Result<Json<DonationImpact>, AppError> {
    let amount = body.amount.value()?;
    Ok(Json(calculate_donation_impact(amount, &state.constants)?))
}

pub async fn calculate_volunteer_impact_query(
    State(state): State<AppState>,
    Query(query): Query<HoursQuery>,
) -> Result<Json<VolunteerImpact>, AppError> {
    let hours = required(query.hours, "hours")?;
    Ok(Json(calculate_volunteer_impact(hours, &state.constants)?))
}

pub async fn calculate_volunteer_impact_body(
    State(state): State<AppState>,
    Json(body): Json<HoursBody>,
) -> Result<Json<VolunteerImpact>, AppError> {
    let hours = body.hours.value()?;
    Ok(Json(calculate_volunteer_impact(hours, &state.constants)?))
}
