use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use crate::database::Database;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeImage {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Dimensions {
    #[validate(range(exclusive_min = 0.0))]
    pub width: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub length: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub height: f64,
}

/// Row layout of the `marquees` table.
#[derive(Debug, Clone, FromRow)]
pub struct MarqueeRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub images: Json<Vec<MarqueeImage>>,
    pub capacity: i32,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub price: f64,
    pub setup_time: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rentable marquee as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marquee {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub images: Vec<MarqueeImage>,
    pub capacity: i32,
    pub dimensions: Dimensions,
    /// Base price per day in pounds
    pub price: f64,
    /// Setup time in hours
    pub setup_time: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MarqueeRow> for Marquee {
    fn from(row: MarqueeRow) -> Self {
        Marquee {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            images: row.images.0,
            capacity: row.capacity,
            dimensions: Dimensions {
                width: row.width,
                length: row.length,
                height: row.height,
            },
            price: row.price,
            setup_time: row.setup_time,
            features: row.features,
            is_active: row.is_active,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MARQUEE_COLUMNS: &str = "id, name, slug, description, images, capacity, width, length, height,
     price, setup_time, features, is_active, notes, created_at, updated_at";

impl Marquee {
    // Internal notes are staff-only
    pub fn public(mut self) -> Self {
        self.notes = None;
        self
    }

    pub async fn find_active(db: &Database) -> Result<Vec<Marquee>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MarqueeRow>(&format!(
            "SELECT {} FROM marquees WHERE is_active = true ORDER BY price, id",
            MARQUEE_COLUMNS
        ))
        .fetch_all(&db.pool)
        .await?;
        Ok(rows.into_iter().map(Marquee::from).collect())
    }

    pub async fn find_all(db: &Database) -> Result<Vec<Marquee>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MarqueeRow>(&format!(
            "SELECT {} FROM marquees ORDER BY id",
            MARQUEE_COLUMNS
        ))
        .fetch_all(&db.pool)
        .await?;
        Ok(rows.into_iter().map(Marquee::from).collect())
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Marquee>, sqlx::Error> {
        let row = sqlx::query_as::<_, MarqueeRow>(&format!(
            "SELECT {} FROM marquees WHERE id = $1",
            MARQUEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
        Ok(row.map(Marquee::from))
    }

    pub async fn insert(db: &Database, req: CreateMarqueeRequest, slug: String) -> Result<Marquee, sqlx::Error> {
        let row = sqlx::query_as::<_, MarqueeRow>(&format!(
            "INSERT INTO marquees
                (name, slug, description, images, capacity, width, length, height,
                 price, setup_time, features, is_active, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {}",
            MARQUEE_COLUMNS
        ))
        .bind(req.name)
        .bind(slug)
        .bind(req.description)
        .bind(Json(req.images))
        .bind(req.capacity)
        .bind(req.dimensions.width)
        .bind(req.dimensions.length)
        .bind(req.dimensions.height)
        .bind(req.price)
        .bind(req.setup_time)
        .bind(req.features)
        .bind(req.is_active.unwrap_or(true))
        .bind(req.notes)
        .fetch_one(&db.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn save(&self, db: &Database) -> Result<Marquee, sqlx::Error> {
        let row = sqlx::query_as::<_, MarqueeRow>(&format!(
            "UPDATE marquees SET
                name = $2, slug = $3, description = $4, images = $5, capacity = $6,
                width = $7, length = $8, height = $9, price = $10, setup_time = $11,
                features = $12, is_active = $13, notes = $14, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            MARQUEE_COLUMNS
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.description)
        .bind(Json(&self.images))
        .bind(self.capacity)
        .bind(self.dimensions.width)
        .bind(self.dimensions.length)
        .bind(self.dimensions.height)
        .bind(self.price)
        .bind(self.setup_time)
        .bind(&self.features)
        .bind(self.is_active)
        .bind(&self.notes)
        .fetch_one(&db.pool)
        .await?;
        Ok(row.into())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarqueeRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub slug: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub images: Vec<MarqueeImage>,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(nested)]
    pub dimensions: Dimensions,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub setup_time: i32,
    #[serde(default)]
    pub features: Vec<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarqueeRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub images: Option<Vec<MarqueeImage>>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    #[validate(nested)]
    pub dimensions: Option<Dimensions>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 1))]
    pub setup_time: Option<i32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

impl UpdateMarqueeRequest {
    /// Applies the provided fields on top of an existing marquee.
    pub fn apply(self, mut marquee: Marquee) -> Marquee {
        if let Some(name) = self.name {
            marquee.name = name;
        }
        if let Some(slug) = self.slug {
            marquee.slug = slug;
        }
        if let Some(description) = self.description {
            marquee.description = description;
        }
        if let Some(images) = self.images {
            marquee.images = images;
        }
        if let Some(capacity) = self.capacity {
            marquee.capacity = capacity;
        }
        if let Some(dimensions) = self.dimensions {
            marquee.dimensions = dimensions;
        }
        if let Some(price) = self.price {
            marquee.price = price;
        }
        if let Some(setup_time) = self.setup_time {
            marquee.setup_time = setup_time;
        }
        if let Some(features) = self.features {
            marquee.features = features;
        }
        if let Some(is_active) = self.is_active {
            marquee.is_active = is_active;
        }
        if self.notes.is_some() {
            marquee.notes = self.notes;
        }
        marquee
    }
}

/// Builds a URL slug from a marquee name: lowercase ASCII alphanumerics
/// separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Marquee {
        Marquee {
            id: 1,
            name: "Classic 6x6 Marquee".into(),
            slug: "classic-6x6-marquee".into(),
            description: "Our most popular marquee".into(),
            images: vec![],
            capacity: 50,
            dimensions: Dimensions { width: 6.0, length: 6.0, height: 3.0 },
            price: 250.0,
            setup_time: 2,
            features: vec!["White canopy".into()],
            is_active: true,
            notes: Some("internal".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Classic 6x6 Marquee"), "classic-6x6-marquee");
        assert_eq!(slugify("  Luxury -- 10x15!! "), "luxury-10x15");
        assert_eq!(slugify("Café Tent"), "caf-tent");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn public_view_drops_notes() {
        assert!(sample().public().notes.is_none());
    }

    #[test]
    fn update_only_touches_given_fields() {
        let update = UpdateMarqueeRequest {
            price: Some(300.0),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = update.apply(sample());
        assert_eq!(updated.price, 300.0);
        assert!(!updated.is_active);
        assert_eq!(updated.capacity, 50);
        assert_eq!(updated.notes.as_deref(), Some("internal"));
    }

    #[test]
    fn create_request_rejects_zero_capacity() {
        let req: CreateMarqueeRequest = serde_json::from_value(serde_json::json!({
            "name": "Tiny",
            "description": "Too small",
            "capacity": 0,
            "dimensions": { "width": 3.0, "length": 3.0, "height": 2.0 },
            "price": 100.0,
            "setupTime": 1
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }
}
