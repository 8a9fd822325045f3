use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::database::Database;
use crate::models::AvailabilityRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub date: NaiveDate,
    pub is_available: bool,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub days: Vec<DayStatus>,
    pub unavailable_dates: Vec<NaiveDate>,
    pub is_bookable: bool,
}

impl AvailabilityReport {
    pub fn day_prices(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.price).collect()
    }
}

/// `count` consecutive calendar dates beginning at `start`.
pub fn stay_dates(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count)
        .filter_map(|offset| start.checked_add_days(Days::new(offset as u64)))
        .collect()
}

/// Every date in `from..=to`; empty when `from` is after `to`.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// Evaluates each date against the sparse override records. A date without
/// a record is available at `base_price`. When several records share a date,
/// any unavailable one blocks it and the first price override wins. Dates
/// before `today` are never available.
pub fn evaluate(
    dates: &[NaiveDate],
    records: &[AvailabilityRecord],
    base_price: f64,
    today: NaiveDate,
) -> AvailabilityReport {
    let days: Vec<DayStatus> = dates
        .iter()
        .map(|&date| {
            let mut matching = records.iter().filter(|r| r.date == date);
            let blocked = matching.clone().any(|r| !r.is_available);
            let price = matching.find_map(|r| r.price).unwrap_or(base_price);

            DayStatus {
                date,
                is_available: !blocked && date >= today,
                price,
            }
        })
        .collect();

    let unavailable_dates: Vec<NaiveDate> = days
        .iter()
        .filter(|d| !d.is_available)
        .map(|d| d.date)
        .collect();

    AvailabilityReport {
        is_bookable: !days.is_empty() && unavailable_dates.is_empty(),
        days,
        unavailable_dates,
    }
}

/// Override records for one marquee within `from..=to`, ordered by date.
pub async fn records_between(
    db: &Database,
    marquee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AvailabilityRecord>, sqlx::Error> {
    sqlx::query_as::<_, AvailabilityRecord>(
        "SELECT id, marquee_id, date, is_available, price, notes, updated_at
         FROM availability
         WHERE marquee_id = $1 AND date >= $2 AND date <= $3
         ORDER BY date",
    )
    .bind(marquee_id)
    .bind(from)
    .bind(to)
    .fetch_all(&db.pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn record(date: NaiveDate, is_available: bool, price: Option<f64>) -> AvailabilityRecord {
        AvailabilityRecord {
            id: 0,
            marquee_id: 1,
            date,
            is_available,
            price,
            notes: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stay_dates_are_consecutive() {
        assert_eq!(stay_dates(day(29), 3), vec![day(29), day(30), NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()]);
        assert!(stay_dates(day(1), 0).is_empty());
    }

    #[test]
    fn dates_between_is_inclusive() {
        assert_eq!(dates_between(day(1), day(3)), vec![day(1), day(2), day(3)]);
        assert_eq!(dates_between(day(5), day(5)), vec![day(5)]);
        assert!(dates_between(day(5), day(4)).is_empty());
    }

    #[test]
    fn missing_records_default_to_available_at_base_price() {
        let report = evaluate(&stay_dates(day(1), 2), &[], 250.0, day(1));
        assert!(report.is_bookable);
        assert_eq!(report.day_prices(), vec![250.0, 250.0]);
    }

    #[test]
    fn unavailable_record_blocks_range() {
        let records = vec![record(day(2), false, None)];
        let report = evaluate(&stay_dates(day(1), 3), &records, 250.0, day(1));
        assert!(!report.is_bookable);
        assert_eq!(report.unavailable_dates, vec![day(2)]);
    }

    #[test]
    fn price_override_applies_to_its_date_only() {
        let records = vec![record(day(2), true, Some(400.0))];
        let report = evaluate(&stay_dates(day(1), 3), &records, 250.0, day(1));
        assert!(report.is_bookable);
        assert_eq!(report.day_prices(), vec![250.0, 400.0, 250.0]);
    }

    #[test]
    fn duplicate_rows_block_if_any_is_unavailable() {
        let records = vec![
            record(day(1), true, Some(300.0)),
            record(day(1), false, Some(500.0)),
        ];
        let report = evaluate(&[day(1)], &records, 250.0, day(1));
        assert!(!report.is_bookable);
        assert_eq!(report.days[0].price, 300.0);
    }

    #[test]
    fn past_dates_are_not_bookable() {
        let report = evaluate(&stay_dates(day(1), 2), &[], 250.0, day(2));
        assert_eq!(report.unavailable_dates, vec![day(1)]);
        assert!(!report.is_bookable);
    }

    #[test]
    fn empty_range_is_not_bookable() {
        let report = evaluate(&[], &[], 250.0, day(1));
        assert!(!report.is_bookable);
    }
}
