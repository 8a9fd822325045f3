use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, PgConnection, Type as SqlxType};
use validator::Validate;

use super::customer::CustomerDetails;
use crate::database::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Status implied by the paid flags. Refunds are only ever set explicitly.
    pub fn from_flags(deposit_paid: bool, balance_paid: bool) -> Self {
        match (deposit_paid, balance_paid) {
            (true, true) => PaymentStatus::Paid,
            (false, false) => PaymentStatus::Pending,
            _ => PaymentStatus::Partial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub daily_rate: f64,
    pub number_of_days: i32,
    pub subtotal: f64,
    pub discount: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payments {
    pub deposit: f64,
    pub deposit_paid: bool,
    pub balance: f64,
    pub balance_paid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub event_type: Option<String>,
    pub guest_count: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub booking_number: String,
    pub customer_id: i64,
    pub marquee_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub setup_time: Option<DateTime<Utc>>,
    pub teardown_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub daily_rate: f64,
    pub number_of_days: i32,
    pub subtotal: f64,
    pub discount: f64,
    pub total_price: f64,
    pub deposit: f64,
    pub deposit_paid: bool,
    pub balance: f64,
    pub balance_paid: bool,
    pub special_requirements: Option<String>,
    pub event_type: Option<String>,
    pub guest_count: Option<i32>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub booking_number: String,
    pub customer_id: i64,
    pub marquee_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub setup_time: Option<DateTime<Utc>>,
    pub teardown_time: Option<DateTime<Utc>>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub pricing: Pricing,
    pub payments: Payments,
    pub special_requirements: Option<String>,
    pub event_details: EventDetails,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            booking_number: row.booking_number,
            customer_id: row.customer_id,
            marquee_id: row.marquee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            setup_time: row.setup_time,
            teardown_time: row.teardown_time,
            status: row.status,
            payment_status: row.payment_status,
            pricing: Pricing {
                daily_rate: row.daily_rate,
                number_of_days: row.number_of_days,
                subtotal: row.subtotal,
                discount: row.discount,
                total_price: row.total_price,
            },
            payments: Payments {
                deposit: row.deposit,
                deposit_paid: row.deposit_paid,
                balance: row.balance,
                balance_paid: row.balance_paid,
            },
            special_requirements: row.special_requirements,
            event_details: EventDetails {
                event_type: row.event_type,
                guest_count: row.guest_count,
                location: row.location,
            },
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/* ---------- persistence ---------- */

/// Everything needed to insert a booking row.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_number: String,
    pub customer_id: i64,
    pub marquee_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub setup_time: Option<DateTime<Utc>>,
    pub teardown_time: Option<DateTime<Utc>>,
    pub pricing: Pricing,
    pub payments: Payments,
    pub special_requirements: Option<String>,
    pub event_details: EventDetails,
    pub notes: Option<String>,
}

const BOOKING_COLUMNS: &str = "id, booking_number, customer_id, marquee_id, start_date, end_date,
     setup_time, teardown_time, status, payment_status, daily_rate, number_of_days, subtotal,
     discount, total_price, deposit, deposit_paid, balance, balance_paid, special_requirements,
     event_type, guest_count, location, notes, created_at, updated_at";

impl Booking {
    pub async fn insert(conn: &mut PgConnection, new: &NewBooking) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO bookings
                (booking_number, customer_id, marquee_id, start_date, end_date, setup_time,
                 teardown_time, status, payment_status, daily_rate, number_of_days, subtotal,
                 discount, total_price, deposit, deposit_paid, balance, balance_paid,
                 special_requirements, event_type, guest_count, location, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 'pending', $8, $9, $10, $11, $12,
                     $13, $14, $15, $16, $17, $18, $19, $20, $21)
             RETURNING id",
        )
        .bind(&new.booking_number)
        .bind(new.customer_id)
        .bind(new.marquee_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.setup_time)
        .bind(new.teardown_time)
        .bind(new.pricing.daily_rate)
        .bind(new.pricing.number_of_days)
        .bind(new.pricing.subtotal)
        .bind(new.pricing.discount)
        .bind(new.pricing.total_price)
        .bind(new.payments.deposit)
        .bind(new.payments.deposit_paid)
        .bind(new.payments.balance)
        .bind(new.payments.balance_paid)
        .bind(&new.special_requirements)
        .bind(&new.event_details.event_type)
        .bind(new.event_details.guest_count)
        .bind(&new.event_details.location)
        .bind(&new.notes)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Booking>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
        Ok(row.map(Booking::from))
    }

    /// Newest first, optionally restricted to one status.
    pub async fn find_all(db: &Database, status: Option<BookingStatus>) -> Result<Vec<Booking>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings
             WHERE ($1::booking_status IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(status)
        .fetch_all(&db.pool)
        .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    pub async fn find_summary(db: &Database, booking_number: &str) -> Result<Option<BookingSummary>, sqlx::Error> {
        sqlx::query_as::<_, BookingSummary>(
            "SELECT b.booking_number, m.name AS marquee_name, m.slug AS marquee_slug,
                    b.start_date, b.end_date, b.status, b.payment_status, b.number_of_days,
                    b.total_price, b.deposit, b.balance
             FROM bookings b
             JOIN marquees m ON m.id = b.marquee_id
             WHERE b.booking_number = $1",
        )
        .bind(booking_number)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn set_status(db: &Database, id: i64, status: BookingStatus) -> Result<Option<Booking>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&db.pool)
        .await?;
        Ok(row.map(Booking::from))
    }

    /// Persists the pricing and payment blocks together with the payment status.
    pub async fn save_money(&self, db: &Database) -> Result<Booking, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET
                discount = $2, total_price = $3, deposit = $4, deposit_paid = $5,
                balance = $6, balance_paid = $7, payment_status = $8, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(self.id)
        .bind(self.pricing.discount)
        .bind(self.pricing.total_price)
        .bind(self.payments.deposit)
        .bind(self.payments.deposit_paid)
        .bind(self.payments.balance)
        .bind(self.payments.balance_paid)
        .bind(self.payment_status)
        .fetch_one(&db.pool)
        .await?;
        Ok(row.into())
    }

    /// Moves confirmed bookings whose end date has passed to completed.
    pub async fn complete_finished(db: &Database, now: DateTime<Utc>) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "UPDATE bookings SET status = 'completed', updated_at = NOW()
             WHERE status = 'confirmed' AND end_date < $1
             RETURNING booking_number",
        )
        .bind(now)
        .fetch_all(&db.pool)
        .await
    }
}

/* ---------- requests ---------- */

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[validate(range(min = 1, message = "guest count must be at least 1"))]
    pub guest_count: Option<i32>,
    pub location: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    #[serde(default, deserialize_with = "optional_flexible_datetime")]
    pub setup_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_flexible_datetime")]
    pub teardown_time: Option<DateTime<Utc>>,
}

/// Body of `POST /api/bookings`, as sent by the booking form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "marqueeId is required"))]
    pub marquee_id: i64,
    #[serde(deserialize_with = "flexible_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub end_date: DateTime<Utc>,
    #[validate(nested)]
    pub customer: CustomerDetails,
    #[serde(default)]
    #[validate(nested)]
    pub event: EventRequest,
    #[serde(default)]
    pub setup: SetupRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub success: bool,
    pub booking_id: i64,
    pub booking_number: String,
    pub message: String,
}

/// Customer-facing summary for the confirmation page.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub booking_number: String,
    pub marquee_name: String,
    pub marquee_slug: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub number_of_days: i32,
    pub total_price: f64,
    pub deposit: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub deposit_paid: Option<bool>,
    pub balance_paid: Option<bool>,
    /// `true` marks a refund. `false` clears one. Absent keeps the current refund.
    pub refunded: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DiscountRequest {
    #[validate(range(min = 0.0))]
    pub discount: f64,
}

/* ---------- date parsing ---------- */

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_flexible_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn optional_flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_flexible_datetime(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn payment_status_follows_flags() {
        assert_eq!(PaymentStatus::from_flags(false, false), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_flags(true, false), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::from_flags(false, true), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::from_flags(true, true), PaymentStatus::Paid);
    }

    #[test]
    fn payment_update_keeps_refund_unset_when_absent() {
        let update: RecordPaymentRequest = serde_json::from_value(json!({ "depositPaid": true })).unwrap();
        assert_eq!(update.deposit_paid, Some(true));
        assert_eq!(update.refunded, None);

        let update: RecordPaymentRequest = serde_json::from_value(json!({ "refunded": false })).unwrap();
        assert_eq!(update.refunded, Some(false));
    }

    #[test]
    fn parses_form_dates() {
        let iso = parse_flexible_datetime("2026-06-01T09:30:00.000Z").unwrap();
        assert_eq!(iso, Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap());

        let plain = parse_flexible_datetime("2026-06-01").unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());

        assert!(parse_flexible_datetime("June 1st").is_none());
    }

    #[test]
    fn deserializes_booking_form_body() {
        let body = json!({
            "marqueeId": 3,
            "startDate": "2026-06-01T00:00:00.000Z",
            "endDate": "2026-06-03",
            "customer": {
                "firstName": "John",
                "lastName": "Smith",
                "email": "John.Smith@Example.com",
                "phone": "07700 900123",
                "company": "Smith Events Ltd",
                "address": { "street": "123 High Street", "city": "London", "postcode": "SW1A 1AA" }
            },
            "event": { "type": "Wedding", "guestCount": 80, "location": "Kent" },
            "setup": { "setupTime": null, "teardownTime": "" }
        });

        let req: CreateBookingRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.marquee_id, 3);
        assert_eq!(req.event.event_type.as_deref(), Some("Wedding"));
        assert!(req.setup.setup_time.is_none());
        assert!(req.setup.teardown_time.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_zero_guests() {
        let event = EventRequest { guest_count: Some(0), ..Default::default() };
        assert!(event.validate().is_err());
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(serde_json::to_value(BookingStatus::Confirmed).unwrap(), json!("confirmed"));
        assert_eq!(serde_json::to_value(PaymentStatus::Refunded).unwrap(), json!("refunded"));
    }
}
