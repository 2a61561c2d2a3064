use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::{
    error::AppError,
    import::{ImportResult, import_rows, read_rows},
    router::AppState,
};

/// Accepts a multipart upload in the `file` field (xlsx, xls, ods, csv or json).
pub async fn import_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResult>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::Validation("No file uploaded".to_string()));
    };
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("{filename} is empty")));
    }

    tracing::info!("Importing {} ({} bytes)", filename, bytes.len());
    let rows = read_rows(&filename, &bytes)?;
    Ok(Json(import_rows(&state.db, rows).await))
}
