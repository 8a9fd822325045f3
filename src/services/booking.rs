//! Booking submission and the staff-side money updates.

use chrono::NaiveDate;
use tracing::{info, warn};
use validator::Validate;

use crate::cache::CacheService;
use crate::config::BookingConfig;
use crate::error::{AppError, AppResult};
use crate::models::booking::{
    Booking, BookingConfirmation, CreateBookingRequest, EventDetails, NewBooking, PaymentStatus,
    RecordPaymentRequest,
};
use crate::models::Customer;
use crate::services::{availability, pricing};

const MAX_NUMBER_ATTEMPTS: usize = 3;
const WEBSITE_NOTE: &str = "Booking created via website";

pub struct BookingService<'a> {
    cache: &'a CacheService,
    config: &'a BookingConfig,
}

impl<'a> BookingService<'a> {
    pub fn new(cache: &'a CacheService, config: &'a BookingConfig) -> Self {
        Self { cache, config }
    }

    /// Validates, prices and stores a booking request from the website.
    pub async fn submit(&self, req: CreateBookingRequest, today: NaiveDate) -> AppResult<BookingConfirmation> {
        req.validate()?;

        let marquee = self
            .cache
            .get_active_marquee(req.marquee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Marquee not found"))?;

        let days = pricing::stay_days(req.start_date, req.end_date, self.config.max_booking_days)?;

        let dates = availability::stay_dates(req.start_date.date_naive(), days);
        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Err(AppError::bad_request("Booking must cover at least one day"));
        };
        let records = availability::records_between(self.cache.db(), marquee.id, first, last).await?;
        let report = availability::evaluate(&dates, &records, marquee.price, today);
        if !report.is_bookable {
            return Err(AppError::Unavailable { dates: report.unavailable_dates });
        }

        let quote = pricing::quote(marquee.price, &report.day_prices(), 0.0);
        let payments = pricing::payments(quote.total_price, self.config.deposit_rate);

        let mut new_booking = NewBooking {
            booking_number: pricing::generate_booking_number(),
            customer_id: 0,
            marquee_id: marquee.id,
            start_date: req.start_date,
            end_date: req.end_date,
            setup_time: req.setup.setup_time,
            teardown_time: req.setup.teardown_time,
            pricing: quote,
            payments,
            special_requirements: non_empty(req.event.special_requirements),
            event_details: EventDetails {
                event_type: non_empty(req.event.event_type),
                guest_count: req.event.guest_count,
                location: non_empty(req.event.location),
            },
            notes: Some(WEBSITE_NOTE.to_string()),
        };

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let mut tx = self.cache.db().pool.begin().await?;
            new_booking.customer_id = Customer::upsert_by_email(&mut *tx, &req.customer).await?;

            match Booking::insert(&mut *tx, &new_booking).await {
                Ok(id) => {
                    tx.commit().await?;
                    info!(
                        "Booking {} created for marquee {} ({} days, total £{:.2})",
                        new_booking.booking_number, marquee.id, days, quote.total_price
                    );
                    return Ok(BookingConfirmation {
                        success: true,
                        booking_id: id,
                        booking_number: new_booking.booking_number,
                        message: "Booking created successfully".to_string(),
                    });
                }
                Err(e) if is_unique_violation(&e) && attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!("Booking number {} already taken, retrying", new_booking.booking_number);
                    if let Err(e) = tx.rollback().await {
                        warn!("Rollback after booking number clash failed: {:?}", e);
                    }
                    new_booking.booking_number = pricing::generate_booking_number();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal("Could not allocate a booking number"))
    }
}

/// Applies a staff payment update. A refund stays in place until it is
/// cleared with `refunded: false`.
pub fn record_payment(mut booking: Booking, update: &RecordPaymentRequest) -> Booking {
    if let Some(paid) = update.deposit_paid {
        booking.payments.deposit_paid = paid;
    }
    if let Some(paid) = update.balance_paid {
        booking.payments.balance_paid = paid;
    }
    let refunded = update
        .refunded
        .unwrap_or(booking.payment_status == PaymentStatus::Refunded);
    booking.payment_status = if refunded {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::from_flags(booking.payments.deposit_paid, booking.payments.balance_paid)
    };
    booking
}

/// Re-prices a booking with a new discount, keeping the paid flags.
pub fn apply_discount(mut booking: Booking, discount: f64, deposit_rate: f64) -> Booking {
    booking.pricing = pricing::with_discount(booking.pricing, discount);
    let fresh = pricing::payments(booking.pricing.total_price, deposit_rate);
    booking.payments.deposit = fresh.deposit;
    booking.payments.balance = fresh.balance;
    booking
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{BookingStatus, Payments, Pricing};
    use chrono::{TimeZone, Utc};

    fn booking() -> Booking {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        Booking {
            id: 1,
            booking_number: "BK123456007".into(),
            customer_id: 1,
            marquee_id: 1,
            start_date: start,
            end_date: start + chrono::Duration::days(2),
            setup_time: None,
            teardown_time: None,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            pricing: Pricing {
                daily_rate: 450.0,
                number_of_days: 2,
                subtotal: 900.0,
                discount: 0.0,
                total_price: 900.0,
            },
            payments: Payments {
                deposit: 225.0,
                deposit_paid: false,
                balance: 675.0,
                balance_paid: false,
            },
            special_requirements: None,
            event_details: EventDetails::default(),
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn deposit_payment_makes_status_partial() {
        let update = RecordPaymentRequest { deposit_paid: Some(true), ..Default::default() };
        let updated = record_payment(booking(), &update);
        assert!(updated.payments.deposit_paid);
        assert_eq!(updated.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn both_payments_make_status_paid() {
        let update = RecordPaymentRequest {
            deposit_paid: Some(true),
            balance_paid: Some(true),
            refunded: None,
        };
        assert_eq!(record_payment(booking(), &update).payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn refund_overrides_flags() {
        let update = RecordPaymentRequest { refunded: Some(true), ..Default::default() };
        assert_eq!(record_payment(booking(), &update).payment_status, PaymentStatus::Refunded);
    }

    #[test]
    fn refund_survives_flag_changes_until_cleared() {
        let mut refunded = booking();
        refunded.payments.deposit_paid = true;
        refunded.payment_status = PaymentStatus::Refunded;

        let unpaid = RecordPaymentRequest { deposit_paid: Some(false), ..Default::default() };
        let updated = record_payment(refunded, &unpaid);
        assert!(!updated.payments.deposit_paid);
        assert_eq!(updated.payment_status, PaymentStatus::Refunded);

        let cleared = RecordPaymentRequest {
            deposit_paid: Some(true),
            refunded: Some(false),
            ..Default::default()
        };
        assert_eq!(record_payment(updated, &cleared).payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn discount_recomputes_deposit_and_balance() {
        let updated = apply_discount(booking(), 100.0, 0.25);
        assert_eq!(updated.pricing.discount, 100.0);
        assert_eq!(updated.pricing.total_price, 800.0);
        assert_eq!(updated.payments.deposit, 200.0);
        assert_eq!(updated.payments.balance, 600.0);
        assert_eq!(updated.pricing.subtotal, 900.0);
    }

    #[test]
    fn blank_event_fields_are_dropped() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" Wedding ".into())).as_deref(), Some("Wedding"));
    }
}
