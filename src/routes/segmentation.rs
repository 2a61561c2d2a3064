use axum::{Json, extract::State};

use crate::{
    error::AppError,
    router::AppState,
    store::segments::{Segment, SegmentCriteria, segment_donors},
};

pub async fn create_segment(
    State(state): State<AppState>,
    Json(criteria): Json<SegmentCriteria>,
) -> Result<Json<Segment>, AppError> {
    if criteria.name.trim().is_empty() {
        return Err(AppError::Validation("segment name is required".to_string()));
    }
    if criteria.min_total.is_some_and(|min| !min.is_finite() || min < 0.0) {
        return Err(AppError::Validation(
            "min_total must be a non-negative number".to_string(),
        ));
    }
    let segment = segment_donors(&state.db, criteria).await?;
    tracing::info!(
        "Segment '{}' matched {} donors",
        segment.name,
        segment.donor_count
    );
    Ok(Json(segment))
}
