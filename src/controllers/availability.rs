use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Days, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::availability::CalendarEntry;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/availability", get(get_availability))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "marqueeId")]
    pub marquee_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub availability: Vec<CalendarEntry>,
}

/// Parses the `marqueeId` query value, which the calendar always sends.
pub fn marquee_id_param(raw: Option<&str>) -> AppResult<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Marquee ID is required"))?;
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request("Marquee ID must be a positive integer"))
}

// GET /api/availability?marqueeId=
async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let marquee_id = marquee_id_param(params.marquee_id.as_deref())?;

    let today = Utc::now().date_naive();
    let window = state.config.booking.availability_window_days.max(0) as u64;
    let until = today
        .checked_add_days(Days::new(window))
        .ok_or_else(|| AppError::internal("availability window overflow"))?;

    let availability = state.cache.get_calendar(marquee_id, today, until).await?;
    Ok(Json(AvailabilityResponse { availability }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_marquee_id() {
        assert!(matches!(marquee_id_param(None), Err(AppError::BadRequest(_))));
        assert!(matches!(marquee_id_param(Some("  ")), Err(AppError::BadRequest(_))));
        assert!(matches!(marquee_id_param(Some("abc")), Err(AppError::BadRequest(_))));
        assert!(matches!(marquee_id_param(Some("-3")), Err(AppError::BadRequest(_))));
        assert_eq!(marquee_id_param(Some("42")).unwrap(), 42);
    }

    #[test]
    fn query_uses_camel_case_key() {
        let q: AvailabilityQuery = serde_urlencoded::from_str("marqueeId=7").unwrap();
        assert_eq!(q.marquee_id.as_deref(), Some("7"));
        let empty: AvailabilityQuery = serde_urlencoded::from_str("").unwrap();
        assert!(empty.marquee_id.is_none());
    }
}
