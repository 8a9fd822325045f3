use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Per-date override for one marquee. Dates without a record are available
/// at the marquee base price.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub id: i64,
    pub marquee_id: i64,
    pub date: NaiveDate,
    pub is_available: bool,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Public calendar entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub is_available: bool,
    pub price: Option<f64>,
}

impl From<&AvailabilityRecord> for CalendarEntry {
    fn from(record: &AvailabilityRecord) -> Self {
        CalendarEntry {
            date: record.date,
            is_available: record.is_available,
            price: record.price,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAvailabilityRequest {
    pub marquee_id: i64,
    pub date: NaiveDate,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub notes: Option<String>,
}

/// Applies the same flag and price to every date in `from..=to`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkAvailabilityRequest {
    pub marquee_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub notes: Option<String>,
}

fn default_available() -> bool {
    true
}
