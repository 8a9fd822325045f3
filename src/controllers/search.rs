use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::search::{self, SearchResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_marquees))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/search?from=YYYY-MM-DD&to=YYYY-MM-DD
async fn search_marquees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResult>> {
    let (Some(from), Some(to)) = (params.from, params.to) else {
        return Err(AppError::bad_request("Please select dates to search for available marquees"));
    };

    let result = search::available_marquees(
        &state.cache,
        from,
        to,
        state.config.booking.search_window_days,
        Utc::now().date_naive(),
    )
    .await?;

    tracing::debug!("search {}..{} matched {} marquees", from, to, result.count);
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_from_query() {
        let q: SearchQuery = serde_urlencoded::from_str("from=2026-06-01&to=2026-06-03").unwrap();
        assert_eq!(q.from, NaiveDate::from_ymd_opt(2026, 6, 1));
        assert_eq!(q.to, NaiveDate::from_ymd_opt(2026, 6, 3));
    }

    #[test]
    fn missing_dates_deserialize_as_none() {
        let q: SearchQuery = serde_urlencoded::from_str("from=2026-06-01").unwrap();
        assert!(q.to.is_none());
    }
}
