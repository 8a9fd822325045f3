use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::booking::{parse_flexible_datetime, Payments, Pricing};
use crate::models::Marquee;
use crate::services::availability::{self, DayStatus};
use crate::services::pricing;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/marquees", get(list_marquees))
        .route("/marquees/{slug}", get(get_marquee))
        .route("/marquees/{slug}/quote", get(quote_marquee))
}

// GET /api/marquees
async fn list_marquees(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Marquee>>> {
    Ok(Json(state.cache.get_active_marquees().await?))
}

// GET /api/marquees/{slug}
async fn get_marquee(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Marquee>> {
    state
        .cache
        .get_active_marquee_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Marquee not found"))
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub marquee_id: i64,
    pub is_bookable: bool,
    pub days: Vec<DayStatus>,
    pub unavailable_dates: Vec<chrono::NaiveDate>,
    pub pricing: Pricing,
    pub payments: Payments,
}

// GET /api/marquees/{slug}/quote?start=&end=
async fn quote_marquee(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<QuoteQuery>,
) -> AppResult<Json<QuoteResponse>> {
    let start = parse_flexible_datetime(&params.start)
        .ok_or_else(|| AppError::bad_request("start must be a date"))?;
    let end = parse_flexible_datetime(&params.end)
        .ok_or_else(|| AppError::bad_request("end must be a date"))?;

    let marquee = match slug.parse::<i64>() {
        Ok(id) => state.cache.get_active_marquee(id).await?,
        Err(_) => state.cache.get_active_marquee_by_slug(&slug).await?,
    }
    .ok_or_else(|| AppError::not_found("Marquee not found"))?;

    let days = pricing::stay_days(start, end, state.config.booking.max_booking_days)?;
    let dates = availability::stay_dates(start.date_naive(), days);
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Err(AppError::bad_request("Quote must cover at least one day"));
    };

    let records = availability::records_between(&state.db, marquee.id, first, last).await?;
    let report = availability::evaluate(&dates, &records, marquee.price, Utc::now().date_naive());

    let quote = pricing::quote(marquee.price, &report.day_prices(), 0.0);
    let payments = pricing::payments(quote.total_price, state.config.booking.deposit_rate);

    Ok(Json(QuoteResponse {
        marquee_id: marquee.id,
        is_bookable: report.is_bookable,
        days: report.days,
        unavailable_dates: report.unavailable_dates,
        pricing: quote,
        payments,
    }))
}
