use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse, UsageResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::{ShortCode, ShortenParams};

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let code = state
        .shortener()
        .shorten(ShortenParams::new(
            request.long_url.clone(),
            request.expiration_seconds,
        ))
        .await?;

    Ok(Json(ShortenResponse {
        short_url: code.to_url(state.base_url()),
        short_code: code.to_string(),
        long_url: request.long_url,
    }))
}

/// Answers with `302 Found` so clients come back on every visit and each hit is counted.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = ShortCode::new(code)?;
    let target = state.shortener().resolve(&code).await?;
    let location =
        HeaderValue::from_str(&target).map_err(|e| AppError::BadLocation(e.to_string()))?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

pub async fn usage_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UsageResponse>> {
    let code = ShortCode::new(code)?;
    let usage_count = state.shortener().usage(&code).await?;

    Ok(Json(UsageResponse {
        short_code: code.to_string(),
        usage_count,
    }))
}
