use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use policyscan::error::InputError;
use policyscan::spreadsheet::{self, XLSX_CONTENT_TYPE};
use policyscan::InsuranceRecord;

use super::ApiError;

/// `POST /download-excel`: a JSON field map in, a one-row workbook out.
pub async fn download_excel(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let data = match body {
        Ok(Json(value)) if value.as_object().is_some_and(|fields| !fields.is_empty()) => value,
        _ => return Err(InputError::NoData.into()),
    };

    let record = InsuranceRecord::from_json_value(data).map_err(|_| InputError::NoData)?;
    let workbook = spreadsheet::build_workbook(&record)?;
    let filename = spreadsheet::export_filename(&chrono::Local::now());

    tracing::info!(
        filename = %filename,
        bytes = workbook.len(),
        "Generated workbook"
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        workbook,
    )
        .into_response())
}
