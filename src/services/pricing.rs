//! Hire pricing: billable days, per-day subtotal, discount, deposit and
//! balance. All amounts are pounds rounded to pence.

use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::booking::{Payments, Pricing};

pub const DEFAULT_DEPOSIT_RATE: f64 = 0.25;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Whole days between two instants, rounding any partial day up.
/// Returns `None` when `end` is not after `start`.
pub fn number_of_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<i32> {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return None;
    }
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    i32::try_from(days).ok()
}

/// Billable days for a requested stay, capped at `max_days`.
pub fn stay_days(start: DateTime<Utc>, end: DateTime<Utc>, max_days: i64) -> AppResult<u32> {
    let days = number_of_days(start, end)
        .ok_or_else(|| AppError::bad_request("endDate must be after startDate"))?;
    if i64::from(days) > max_days {
        return Err(AppError::bad_request(format!(
            "A stay may cover at most {} days",
            max_days
        )));
    }
    Ok(days as u32)
}

/// Prices a stay from the effective price of each billed day.
pub fn quote(daily_rate: f64, day_prices: &[f64], discount: f64) -> Pricing {
    let subtotal = round_money(day_prices.iter().sum());
    let discount = round_money(discount.clamp(0.0, subtotal));

    Pricing {
        daily_rate: round_money(daily_rate),
        number_of_days: day_prices.len() as i32,
        subtotal,
        discount,
        total_price: round_money(subtotal - discount),
    }
}

/// Re-applies a discount to an existing quote.
pub fn with_discount(pricing: Pricing, discount: f64) -> Pricing {
    let discount = round_money(discount.clamp(0.0, pricing.subtotal));
    Pricing {
        discount,
        total_price: round_money(pricing.subtotal - discount),
        ..pricing
    }
}

/// Deposit due to confirm a booking and the remaining balance. Paid flags
/// start cleared.
pub fn payments(total_price: f64, deposit_rate: f64) -> Payments {
    let deposit = round_money(total_price * deposit_rate);
    Payments {
        deposit,
        deposit_paid: false,
        balance: round_money(total_price - deposit),
        balance_paid: false,
    }
}

/// Booking reference: `BK`, the last six digits of the millisecond clock,
/// then three digits taken from `random`.
pub fn booking_number(now: DateTime<Utc>, random: u128) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("BK{:06}{:03}", millis, random % 1000)
}

pub fn generate_booking_number() -> String {
    booking_number(Utc::now(), uuid::Uuid::new_v4().as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn counts_whole_and_partial_days() {
        assert_eq!(number_of_days(at(2026, 6, 1, 0), at(2026, 6, 3, 0)), Some(2));
        assert_eq!(number_of_days(at(2026, 6, 1, 9), at(2026, 6, 1, 17)), Some(1));
        assert_eq!(number_of_days(at(2026, 6, 1, 9), at(2026, 6, 3, 10)), Some(3));
        assert_eq!(number_of_days(at(2026, 6, 1, 0), at(2026, 6, 1, 0)), None);
        assert_eq!(number_of_days(at(2026, 6, 3, 0), at(2026, 6, 1, 0)), None);
    }

    #[test]
    fn stay_length_is_capped() {
        assert_eq!(stay_days(at(2026, 6, 1, 0), at(2026, 6, 3, 0), 730).unwrap(), 2);
        assert_eq!(stay_days(at(2026, 6, 1, 0), at(2028, 5, 31, 0), 730).unwrap(), 730);
        assert!(stay_days(at(2026, 6, 1, 0), at(2028, 6, 1, 0), 730).is_err());
        assert!(stay_days(at(2026, 6, 3, 0), at(2026, 6, 1, 0), 730).is_err());
    }

    #[test]
    fn far_future_end_date_is_rejected() {
        let start = at(2026, 6, 1, 0);
        let end = crate::models::booking::parse_flexible_datetime("+200000-01-01").unwrap();
        let err = stay_days(start, end, 730).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let end = crate::models::booking::parse_flexible_datetime("9999-12-31").unwrap();
        assert!(stay_days(start, end, 730).is_err());
    }

    #[test]
    fn quotes_with_overrides() {
        let pricing = quote(250.0, &[250.0, 300.0, 250.0], 0.0);
        assert_eq!(pricing.number_of_days, 3);
        assert_eq!(pricing.subtotal, 800.0);
        assert_eq!(pricing.total_price, 800.0);
        assert_eq!(pricing.daily_rate, 250.0);
    }

    #[test]
    fn deposit_is_a_quarter() {
        let p = payments(900.0, DEFAULT_DEPOSIT_RATE);
        assert_eq!(p.deposit, 225.0);
        assert_eq!(p.balance, 675.0);
        assert!(!p.deposit_paid && !p.balance_paid);
    }

    #[test]
    fn deposit_rounds_to_pence() {
        let p = payments(333.33, DEFAULT_DEPOSIT_RATE);
        assert_eq!(p.deposit, 83.33);
        assert_eq!(p.balance, 250.0);
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        let pricing = with_discount(quote(100.0, &[100.0, 100.0], 0.0), 500.0);
        assert_eq!(pricing.discount, 200.0);
        assert_eq!(pricing.total_price, 0.0);
    }

    #[test]
    fn booking_number_layout() {
        let now = Utc.timestamp_millis_opt(1_718_000_123_456).unwrap();
        assert_eq!(booking_number(now, 7), "BK123456007");
        assert_eq!(booking_number(now, 1_999), "BK123456999");

        let early = now - Duration::milliseconds(123_456 - 42);
        assert_eq!(booking_number(early, 0), "BK000042000");
    }

    #[test]
    fn generated_numbers_have_fixed_shape() {
        let number = generate_booking_number();
        assert_eq!(number.len(), 11);
        assert!(number.starts_with("BK"));
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }

    proptest! {
        #[test]
        fn deposit_plus_balance_is_total(total in 0u32..10_000_000u32) {
            let total = total as f64 / 100.0;
            let p = payments(total, DEFAULT_DEPOSIT_RATE);
            prop_assert!((p.deposit + p.balance - total).abs() < 0.005);
            prop_assert!(p.deposit <= total + 0.005);
        }

        #[test]
        fn total_is_subtotal_minus_discount(
            prices in proptest::collection::vec(0u32..100_000u32, 1..30),
            discount in 0u32..1_000_000u32,
        ) {
            let prices: Vec<f64> = prices.into_iter().map(|p| p as f64 / 100.0).collect();
            let pricing = quote(prices[0], &prices, discount as f64 / 100.0);
            prop_assert_eq!(pricing.number_of_days as usize, prices.len());
            prop_assert!(pricing.total_price >= 0.0);
            prop_assert!((pricing.subtotal - pricing.discount - pricing.total_price).abs() < 0.005);
        }
    }
}
