//! Company lookup handlers

use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::errors::AppResult;
use crate::web::{
    AppState,
    responses::{not_found, ok},
};

pub const CIK_NOT_FOUND: &str = "CIK not found";
pub const TICKER_NOT_FOUND: &str = "Ticker not found";

/// `GET /cik/{id}`: the record whose identifier equals `id` exactly
pub async fn get_company_by_cik(
    State(state): State<AppState>,
    Path(cik): Path<String>,
) -> AppResult<Response> {
    Ok(match state.service.find_by_identifier(&cik).await? {
        Some(record) => ok(record),
        None => not_found(CIK_NOT_FOUND),
    })
}

/// `GET /ticker/{symbol}`: every record listing `symbol`, case-insensitively
pub async fn get_companies_by_ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> AppResult<Response> {
    Ok(match state.service.find_by_ticker(&symbol).await? {
        Some(records) => ok(records),
        None => not_found(TICKER_NOT_FOUND),
    })
}
