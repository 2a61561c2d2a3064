use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use super::NumberInput;
use crate::{
    entities::{volunteer, volunteer_shift},
    error::AppError,
    impact::{VolunteerImpact, calculate_volunteer_impact},
    import::parse_date,
    router::AppState,
    store::{
        Identifier,
        volunteers::{find_volunteer, log_shift, shifts_for_volunteer},
    },
};

#[derive(Deserialize)]
pub struct ShiftRequest {
    pub email: String,
    pub hours: NumberInput,
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct ShiftResponse {
    pub shift: volunteer_shift::Model,
    pub impact: VolunteerImpact,
}

pub async fn log_volunteer_shift(
    State(state): State<AppState>,
    Json(request): Json<ShiftRequest>,
) -> Result<Json<ShiftResponse>, AppError> {
    let hours = request.hours.value()?;
    let impact = calculate_volunteer_impact(hours, &state.constants)?;
    if hours == 0.0 {
        return Err(AppError::Validation(
            "hours must be greater than zero".to_string(),
        ));
    }
    let shift_date = match request.date.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(
            parse_date(text)
                .ok_or_else(|| AppError::Validation(format!("invalid date: '{text}'")))?,
        ),
        _ => None,
    };

    let (volunteer, shift) = log_shift(&state.db, &request.email, hours, shift_date).await?;
    tracing::info!("Logged {} hours for {}", hours, volunteer.email);
    Ok(Json(ShiftResponse { shift, impact }))
}

#[derive(Serialize)]
pub struct VolunteerResponse {
    pub volunteer: volunteer::Model,
    pub shift: Option<volunteer_shift::Model>,
    pub shifts: Vec<volunteer_shift::Model>,
    pub total_hours: f64,
    pub impact: VolunteerImpact,
}

pub async fn get_volunteer(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<VolunteerResponse>, AppError> {
    let volunteer = find_volunteer(&state.db, &Identifier::parse(&identifier))
        .await?
        .ok_or_else(|| AppError::NotFound("Volunteer not found".to_string()))?;
    let shifts = shifts_for_volunteer(&state.db, volunteer.id).await?;
    let total_hours: f64 = shifts.iter().map(|s| s.hours).sum();
    let impact = calculate_volunteer_impact(total_hours, &state.constants)?;

    Ok(Json(VolunteerResponse {
        volunteer,
        shift: shifts.first().cloned(),
        shifts,
        total_hours,
        impact,
    }))
}
