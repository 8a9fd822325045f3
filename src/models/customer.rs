use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use validator::{Validate, ValidationError};

use crate::database::Database;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(custom(function = "not_blank", message = "street is required"))]
    pub street: String,
    #[validate(custom(function = "not_blank", message = "city is required"))]
    pub city: String,
    #[validate(custom(function = "not_blank", message = "postcode is required"))]
    pub postcode: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub address: Address,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            address: Address {
                street: row.street,
                city: row.city,
                postcode: row.postcode,
            },
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, company, street, city,
     postcode, notes, is_active, created_at, updated_at";

impl Customer {
    /// Creates the customer or overwrites the contact details of the one
    /// already holding this email. Returns the customer id.
    pub async fn upsert_by_email(
        conn: &mut PgConnection,
        details: &CustomerDetails,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO customers
                (first_name, last_name, email, phone, company, street, city, postcode, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true)
             ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                company = EXCLUDED.company,
                street = EXCLUDED.street,
                city = EXCLUDED.city,
                postcode = EXCLUDED.postcode,
                updated_at = NOW()
             RETURNING id",
        )
        .bind(details.first_name.trim())
        .bind(details.last_name.trim())
        .bind(normalize_email(&details.email))
        .bind(details.phone.trim())
        .bind(details.company.as_deref().map(str::trim).filter(|c| !c.is_empty()))
        .bind(details.address.street.trim())
        .bind(details.address.city.trim())
        .bind(details.address.postcode.trim())
        .fetch_one(conn)
        .await
    }

    pub async fn find_all(db: &Database) -> Result<Vec<Customer>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers ORDER BY last_name, first_name, id",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&db.pool)
        .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Customer>, sqlx::Error> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
        Ok(row.map(Customer::from))
    }
}

/// Contact details submitted with a booking request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[validate(custom(function = "not_blank", message = "first name is required"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "phone number is required"))]
    pub phone: String,
    pub company: Option<String>,
    #[validate(nested)]
    pub address: Address,
}

/// Required text fields are stored trimmed, so whitespace alone is empty.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Emails are stored trimmed and lowercased so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(email: &str) -> CustomerDetails {
        CustomerDetails {
            first_name: "Sarah".into(),
            last_name: "Johnson".into(),
            email: email.into(),
            phone: "07700 900456".into(),
            company: None,
            address: Address {
                street: "456 Oak Avenue".into(),
                city: "Manchester".into(),
                postcode: "M1 1AA".into(),
            },
        }
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Sarah.Johnson@Example.COM "), "sarah.johnson@example.com");
    }

    #[test]
    fn rejects_bad_email() {
        assert!(details("not-an-email").validate().is_err());
        assert!(details("sarah@example.com").validate().is_ok());
    }

    #[test]
    fn rejects_missing_address_parts() {
        let mut d = details("sarah@example.com");
        d.address.postcode.clear();
        assert!(d.validate().is_err());
    }

    #[test]
    fn rejects_whitespace_only_required_fields() {
        let blank = CustomerDetails {
            first_name: "   ".into(),
            last_name: " ".into(),
            email: "sarah@example.com".into(),
            phone: "\t".into(),
            company: None,
            address: Address {
                street: "  ".into(),
                city: " ".into(),
                postcode: "   ".into(),
            },
        };
        let errors = blank.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));
        assert!(fields.contains_key("phone"));
        assert!(errors.errors().contains_key("address"));

        let mut d = details("sarah@example.com");
        d.first_name = "  Sarah ".into();
        assert!(d.validate().is_ok());
    }
}
