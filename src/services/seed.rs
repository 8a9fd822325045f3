//! Sample catalog, customers and a 90-day availability pattern for demo and
//! staging databases. Re-running is safe: existing rows are left alone.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use sqlx::{types::Json, Postgres, QueryBuilder};
use tracing::info;

use crate::database::Database;
use crate::models::marquee::{slugify, MarqueeImage};

const SEED_DAYS: u32 = 90;
const PREMIUM_PRICE: f64 = 400.0;
const BATCH_SIZE: usize = 500;

struct SampleMarquee {
    name: &'static str,
    description: &'static str,
    capacity: i32,
    dimensions: (f64, f64, f64),
    price: f64,
    setup_time: i32,
    image: &'static str,
    features: &'static [&'static str],
}

const MARQUEES: &[SampleMarquee] = &[
    SampleMarquee {
        name: "Classic 6x6 Marquee",
        description: "Our most popular marquee, perfect for intimate gatherings and small events. \
                      Features a traditional white canopy with clear sides for all-weather protection.",
        capacity: 50,
        dimensions: (6.0, 6.0, 3.0),
        price: 250.0,
        setup_time: 2,
        image: "/media/classic-6x6.webp",
        features: &["White canopy", "Clear side panels", "LED lighting", "Ground anchors"],
    },
    SampleMarquee {
        name: "Premium 8x12 Marquee",
        description: "Spacious marquee ideal for medium-sized events, weddings, and corporate functions. \
                      Includes premium flooring and climate control options.",
        capacity: 120,
        dimensions: (8.0, 12.0, 3.5),
        price: 450.0,
        setup_time: 4,
        image: "/media/premium-8x12.webp",
        features: &[
            "Premium white canopy",
            "Clear side panels",
            "LED lighting system",
            "Heating available",
            "Premium flooring",
            "Power supply",
        ],
    },
    SampleMarquee {
        name: "Luxury 10x15 Marquee",
        description: "Our largest and most luxurious marquee, perfect for grand events, large weddings, \
                      and corporate galas. Features premium amenities and full climate control.",
        capacity: 200,
        dimensions: (10.0, 15.0, 4.0),
        price: 750.0,
        setup_time: 6,
        image: "/media/luxury-10x15.webp",
        features: &[
            "Luxury white canopy",
            "Clear side panels",
            "Advanced LED lighting",
            "Full climate control",
            "Premium flooring",
            "Power supply",
            "Sound system available",
            "Bar area setup",
        ],
    },
];

// first, last, email, phone, company, street, city, postcode, notes
type SampleCustomer = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const CUSTOMERS: &[SampleCustomer] = &[
    (
        "John", "Smith", "john.smith@example.com", "07700 900123", Some("Smith Events Ltd"),
        "123 High Street", "London", "SW1A 1AA", "Regular customer, prefers premium marquees",
    ),
    (
        "Sarah", "Johnson", "sarah.johnson@example.com", "07700 900456", None,
        "456 Oak Avenue", "Manchester", "M1 1AA", "Wedding planner, books frequently",
    ),
    (
        "Michael", "Brown", "michael.brown@example.com", "07700 900789", Some("Brown Corporate Events"),
        "789 Business Park", "Birmingham", "B1 1AA", "Corporate client, prefers luxury marquees",
    ),
];

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub marquees: u64,
    pub customers: u64,
    pub availability_records: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeededDay {
    pub is_available: bool,
    pub price: Option<f64>,
    pub notes: Option<&'static str>,
}

/// Availability for one seeded day from a uniform `roll` in `[0, 1)`.
/// Weekdays are free 70% of the time; weekends for premium marquees 50%.
pub fn seeded_day(date: NaiveDate, base_price: f64, roll: f64) -> SeededDay {
    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    let threshold = if weekend && base_price > PREMIUM_PRICE { 0.5 } else { 0.3 };
    let is_available = roll > threshold;

    SeededDay {
        is_available,
        price: is_available.then_some(base_price),
        notes: (!is_available).then_some("Booked for private event"),
    }
}

fn roll() -> f64 {
    (uuid::Uuid::new_v4().as_u128() % 10_000) as f64 / 10_000.0
}

pub async fn run(db: &Database, today: NaiveDate) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();
    let mut tx = db.pool.begin().await?;

    for m in MARQUEES {
        let images = vec![
            MarqueeImage { url: m.image.to_string(), alt_text: Some(format!("{} exterior view", m.name)) },
            MarqueeImage { url: m.image.to_string(), alt_text: Some(format!("{} interior setup", m.name)) },
        ];
        let features: Vec<String> = m.features.iter().map(|f| f.to_string()).collect();

        report.marquees += sqlx::query(
            "INSERT INTO marquees
                (name, slug, description, images, capacity, width, length, height, price, setup_time, features)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(m.name)
        .bind(slugify(m.name))
        .bind(m.description)
        .bind(Json(images))
        .bind(m.capacity)
        .bind(m.dimensions.0)
        .bind(m.dimensions.1)
        .bind(m.dimensions.2)
        .bind(m.price)
        .bind(m.setup_time)
        .bind(features)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for (first, last, email, phone, company, street, city, postcode, notes) in CUSTOMERS {
        report.customers += sqlx::query(
            "INSERT INTO customers
                (first_name, last_name, email, phone, company, street, city, postcode, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(phone)
        .bind(company)
        .bind(street)
        .bind(city)
        .bind(postcode)
        .bind(notes)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    let marquees: Vec<(i64, f64)> = sqlx::query_as("SELECT id, price FROM marquees ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;

    let mut rows: Vec<(i64, NaiveDate, SeededDay)> = Vec::new();
    for date in crate::services::availability::stay_dates(today, SEED_DAYS) {
        for &(marquee_id, price) in &marquees {
            rows.push((marquee_id, date, seeded_day(date, price, roll())));
        }
    }

    for batch in rows.chunks(BATCH_SIZE) {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO availability (marquee_id, date, is_available, price, notes) ",
        );
        qb.push_values(batch, |mut b, (marquee_id, date, day)| {
            b.push_bind(*marquee_id)
                .push_bind(*date)
                .push_bind(day.is_available)
                .push_bind(day.price)
                .push_bind(day.notes);
        });
        qb.push(" ON CONFLICT (marquee_id, date) DO NOTHING");
        report.availability_records += qb.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    info!(
        "Seeded {} marquees, {} customers, {} availability records",
        report.marquees, report.customers, report.availability_records
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-06-06 is a Saturday, 2026-06-08 a Monday
    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 6).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 8).unwrap()
    }

    #[test]
    fn available_days_carry_base_price() {
        let day = seeded_day(monday(), 250.0, 0.9);
        assert_eq!(day, SeededDay { is_available: true, price: Some(250.0), notes: None });
    }

    #[test]
    fn booked_days_carry_note() {
        let day = seeded_day(monday(), 250.0, 0.1);
        assert!(!day.is_available);
        assert_eq!(day.price, None);
        assert_eq!(day.notes, Some("Booked for private event"));
    }

    #[test]
    fn premium_weekends_book_up_faster() {
        assert!(!seeded_day(saturday(), 750.0, 0.4).is_available);
        assert!(seeded_day(saturday(), 250.0, 0.4).is_available);
        assert!(seeded_day(monday(), 750.0, 0.4).is_available);
    }

    #[test]
    fn sample_slugs_are_unique() {
        let mut slugs: Vec<String> = MARQUEES.iter().map(|m| slugify(m.name)).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), MARQUEES.len());
    }
}
