use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;

use crate::cache::CacheService;
use crate::error::{AppError, AppResult};
use crate::models::Marquee;
use crate::services::{availability, pricing};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub marquee: Marquee,
    /// Sum of the effective day prices across the searched dates
    pub quoted_total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub count: usize,
    pub marquees: Vec<SearchHit>,
}

/// Rejects inverted ranges and ranges longer than `max_days` days.
pub fn check_range(from: NaiveDate, to: NaiveDate, max_days: i64) -> AppResult<()> {
    if from > to {
        return Err(AppError::bad_request("'from' must not be after 'to'"));
    }
    let span = (to - from).num_days() + 1;
    if span > max_days {
        return Err(AppError::bad_request(format!(
            "Search range may cover at most {} days",
            max_days
        )));
    }
    Ok(())
}

/// A public search window: a valid range that does not start in the past.
pub fn check_search_range(
    from: NaiveDate,
    to: NaiveDate,
    max_days: i64,
    today: NaiveDate,
) -> AppResult<()> {
    check_range(from, to, max_days)?;
    if from < today {
        return Err(AppError::bad_request("'from' must not be in the past"));
    }
    Ok(())
}

/// Active marquees with no unavailable date in `from..=to`, cheapest first.
pub async fn available_marquees(
    cache: &CacheService,
    from: NaiveDate,
    to: NaiveDate,
    max_days: i64,
    today: NaiveDate,
) -> AppResult<SearchResult> {
    check_search_range(from, to, max_days, today)?;

    let marquees = cache.get_active_marquees().await?;
    let dates = availability::dates_between(from, to);

    let checks = marquees.into_iter().map(|marquee| {
        let dates = &dates;
        async move {
            let records = availability::records_between(cache.db(), marquee.id, from, to).await?;
            let report = availability::evaluate(dates, &records, marquee.price, today);
            Ok::<_, sqlx::Error>((marquee, report))
        }
    });

    let hits: Vec<SearchHit> = try_join_all(checks)
        .await?
        .into_iter()
        .filter(|(_, report)| report.is_bookable)
        .map(|(marquee, report)| SearchHit {
            quoted_total: pricing::round_money(report.day_prices().iter().sum()),
            marquee,
        })
        .collect();

    Ok(SearchResult {
        from,
        to,
        count: hits.len(),
        marquees: hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn accepts_single_day_and_full_window() {
        assert!(check_range(day(1), day(1), 90).is_ok());
        assert!(check_range(day(1), day(30), 30).is_ok());
    }

    #[test]
    fn rejects_inverted_and_oversized_ranges() {
        assert!(matches!(check_range(day(2), day(1), 90), Err(AppError::BadRequest(_))));
        assert!(matches!(check_range(day(1), day(30), 29), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn search_rejects_past_start() {
        let today = day(10);
        assert!(matches!(
            check_search_range(day(9), day(12), 90, today),
            Err(AppError::BadRequest(_))
        ));
        assert!(check_search_range(day(10), day(12), 90, today).is_ok());
        assert!(check_search_range(day(11), day(12), 90, today).is_ok());
    }
}
