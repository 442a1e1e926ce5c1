//! HTTP endpoint handlers
//!
//! Handlers validate request parameters, call into `StockService`, and attach
//! per-route `Cache-Control` headers. Error-to-status mapping lives on
//! `AppError`'s `IntoResponse` impl.

use crate::api::types::{
    CumulativeReturnRequest, CumulativeReturnResponse, HealthResponse, PriceQuery,
};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Json, Path, Query, State};
use axum::http::header::{HeaderName, CACHE_CONTROL};
use axum::response::{AppendHeaders, IntoResponse, Response};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::debug;

const MAX_PAGE_SIZE: usize = 1000;

fn cache_control(value: &'static str) -> AppendHeaders<[(HeaderName, &'static str); 1]> {
    AppendHeaders([(CACHE_CONTROL, value)])
}

/// Health check endpoint - GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// List all stock names - GET /api/stocks/
///
/// The stock list rarely changes, so it is cacheable for an hour.
pub async fn list_stocks(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let names = state.stocks.list_stocks()?;
    Ok((cache_control("public, max-age=3600"), Json(names)))
}

/// Paginated price history - GET /api/stocks/{name}/prices?skip=&limit=
pub async fn list_prices(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse> {
    if query.limit < 1 || query.limit > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    debug!(
        "Getting prices for {} with skip={}, limit={}",
        name, query.skip, query.limit
    );
    let list = state.stocks.stock_prices(&name, query.skip, query.limit)?;
    Ok((cache_control("public, max-age=300"), Json(list)))
}

/// Price at an exact calendar date - GET /api/stocks/{name}/prices/{date}
pub async fn price_at_date(
    State(state): State<Arc<AppState>>,
    Path((name, date)): Path<(String, NaiveDate)>,
) -> Result<Response> {
    debug!("Getting price for {} at {}", name, date);
    let record = state.stocks.price_at_date(&name, date)?.ok_or_else(|| {
        AppError::RecordNotFound(format!("Price not found for {name} at {date}"))
    })?;

    // Past dates never change, so they are cacheable for a day.
    if date < Local::now().date_naive() {
        Ok((cache_control("public, max-age=86400"), Json(record)).into_response())
    } else {
        Ok(Json(record).into_response())
    }
}

/// Cumulative return over a date window - POST /api/stocks/{name}/returns
pub async fn calculate_returns(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<CumulativeReturnRequest>,
) -> Result<Json<CumulativeReturnResponse>> {
    if req.end_date < req.start_date {
        return Err(AppError::InvalidInput(
            "end_date must be after start_date".to_string(),
        ));
    }

    let result = state
        .stocks
        .calculate_returns(&name, req.start_date, req.end_date)?;

    Ok(Json(CumulativeReturnResponse {
        name: result.name,
        start_date: result.start_date,
        end_date: result.end_date,
        cumulative_return: result.cumulative_return,
        start_price: result.start_price,
        end_price: result.end_price,
    }))
}
