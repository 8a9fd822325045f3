//! Staff-only management endpoints. Every handler takes a [`StaffUser`], so
//! requests without valid Basic credentials are rejected with 401.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::StaffUser;
use crate::models::availability::{BulkAvailabilityRequest, UpsertAvailabilityRequest};
use crate::models::booking::{DiscountRequest, RecordPaymentRequest, UpdateStatusRequest};
use crate::models::marquee::{slugify, CreateMarqueeRequest, UpdateMarqueeRequest};
use crate::models::{AvailabilityRecord, Booking, BookingStatus, Customer, Marquee};
use crate::services::{availability, booking, seed};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/marquees", get(list_marquees).post(create_marquee))
        .route("/admin/marquees/{id}", patch(update_marquee))
        .route("/admin/availability", put(upsert_availability))
        .route("/admin/availability/bulk", put(bulk_availability))
        .route("/admin/availability/{id}", delete(delete_availability))
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/bookings/{id}", get(get_booking))
        .route("/admin/bookings/{id}/status", patch(update_booking_status))
        .route("/admin/bookings/{id}/payments", patch(record_payment))
        .route("/admin/bookings/{id}/discount", patch(apply_discount))
        .route("/admin/customers", get(list_customers))
        .route("/admin/customers/{id}", get(get_customer))
        .route("/admin/seed", post(run_seed))
}

/* ---------- MARQUEES ---------- */

async fn list_marquees(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<Marquee>>> {
    Ok(Json(Marquee::find_all(&state.db).await?))
}

fn resolve_slug(requested: Option<&str>, name: &str) -> AppResult<String> {
    let slug = slugify(requested.unwrap_or(name));
    if slug.is_empty() {
        return Err(AppError::bad_request("slug must contain letters or digits"));
    }
    Ok(slug)
}

fn slug_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict("A marquee with this slug already exists")
        }
        _ => e.into(),
    }
}

// POST /api/admin/marquees
async fn create_marquee(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Json(req): Json<CreateMarqueeRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    let slug = resolve_slug(req.slug.as_deref(), &req.name)?;

    let marquee = Marquee::insert(&state.db, req, slug).await.map_err(slug_conflict)?;
    state.cache.invalidate_marquees().await;

    info!("{} created marquee {} ({})", staff.email, marquee.id, marquee.slug);
    Ok((StatusCode::CREATED, Json(marquee)))
}

// PATCH /api/admin/marquees/{id}
async fn update_marquee(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMarqueeRequest>,
) -> AppResult<Json<Marquee>> {
    req.validate()?;

    let current = Marquee::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Marquee not found"))?;

    let requested_slug = req.slug.clone();
    let mut updated = req.apply(current);
    if let Some(slug) = requested_slug {
        updated.slug = resolve_slug(Some(&slug), &updated.name)?;
    }

    let saved = updated.save(&state.db).await.map_err(slug_conflict)?;
    state.cache.invalidate_marquees().await;
    state.cache.invalidate_availability(id).await;

    info!("{} updated marquee {}", staff.email, id);
    Ok(Json(saved))
}

/* ---------- AVAILABILITY ---------- */

async fn ensure_marquee_exists(state: &AppState, marquee_id: i64) -> AppResult<()> {
    Marquee::find_by_id(&state.db, marquee_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Marquee not found"))
}

// PUT /api/admin/availability
async fn upsert_availability(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<UpsertAvailabilityRequest>,
) -> AppResult<Json<AvailabilityRecord>> {
    req.validate()?;
    ensure_marquee_exists(&state, req.marquee_id).await?;

    let record = sqlx::query_as::<_, AvailabilityRecord>(
        "INSERT INTO availability (marquee_id, date, is_available, price, notes)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (marquee_id, date) DO UPDATE SET
            is_available = EXCLUDED.is_available,
            price = EXCLUDED.price,
            notes = EXCLUDED.notes,
            updated_at = NOW()
         RETURNING id, marquee_id, date, is_available, price, notes, updated_at",
    )
    .bind(req.marquee_id)
    .bind(req.date)
    .bind(req.is_available)
    .bind(req.price)
    .bind(&req.notes)
    .fetch_one(&state.db.pool)
    .await?;

    state.cache.invalidate_availability(req.marquee_id).await;
    Ok(Json(record))
}

// PUT /api/admin/availability/bulk
async fn bulk_availability(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Json(req): Json<BulkAvailabilityRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;
    crate::services::search::check_range(req.from, req.to, 366)?;
    ensure_marquee_exists(&state, req.marquee_id).await?;

    let dates = availability::dates_between(req.from, req.to);
    let updated = sqlx::query(
        "INSERT INTO availability (marquee_id, date, is_available, price, notes)
         SELECT $1, d, $3, $4, $5 FROM UNNEST($2::date[]) AS d
         ON CONFLICT (marquee_id, date) DO UPDATE SET
            is_available = EXCLUDED.is_available,
            price = EXCLUDED.price,
            notes = EXCLUDED.notes,
            updated_at = NOW()",
    )
    .bind(req.marquee_id)
    .bind(&dates)
    .bind(req.is_available)
    .bind(req.price)
    .bind(&req.notes)
    .execute(&state.db.pool)
    .await?
    .rows_affected();

    state.cache.invalidate_availability(req.marquee_id).await;
    info!(
        "{} set {} availability records for marquee {} ({}..{})",
        staff.email, updated, req.marquee_id, req.from, req.to
    );
    Ok(Json(json!({ "updated": updated })))
}

// DELETE /api/admin/availability/{id}
async fn delete_availability(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let marquee_id = sqlx::query_scalar::<_, i64>(
        "DELETE FROM availability WHERE id = $1 RETURNING marquee_id",
    )
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Availability record not found"))?;

    state.cache.invalidate_availability(marquee_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/* ---------- BOOKINGS ---------- */

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub status: Option<BookingStatus>,
}

async fn find_booking(state: &AppState, id: i64) -> AppResult<Booking> {
    Booking::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking not found"))
}

// GET /api/admin/bookings?status=
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Query(params): Query<BookingsQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    Ok(Json(Booking::find_all(&state.db, params.status).await?))
}

// GET /api/admin/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Booking>> {
    Ok(Json(find_booking(&state, id).await?))
}

// PATCH /api/admin/bookings/{id}/status
async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<Booking>> {
    let booking = Booking::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    info!("{} set booking {} to {:?}", staff.email, booking.booking_number, booking.status);
    Ok(Json(booking))
}

// PATCH /api/admin/bookings/{id}/payments
async fn record_payment(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<RecordPaymentRequest>,
) -> AppResult<Json<Booking>> {
    let current = find_booking(&state, id).await?;
    let saved = booking::record_payment(current, &req).save_money(&state.db).await?;

    info!(
        "{} recorded payment on {}: {:?}",
        staff.email, saved.booking_number, saved.payment_status
    );
    Ok(Json(saved))
}

// PATCH /api/admin/bookings/{id}/discount
async fn apply_discount(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<DiscountRequest>,
) -> AppResult<Json<Booking>> {
    req.validate()?;
    let current = find_booking(&state, id).await?;
    let saved = booking::apply_discount(current, req.discount, state.config.booking.deposit_rate)
        .save_money(&state.db)
        .await?;

    info!(
        "{} applied £{:.2} discount to {}",
        staff.email, saved.pricing.discount, saved.booking_number
    );
    Ok(Json(saved))
}

/* ---------- CUSTOMERS ---------- */

async fn list_customers(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<Customer>>> {
    Ok(Json(Customer::find_all(&state.db).await?))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    Customer::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Customer not found"))
}

/* ---------- SEED ---------- */

// POST /api/admin/seed
async fn run_seed(
    State(state): State<Arc<AppState>>,
    staff: StaffUser,
) -> AppResult<impl IntoResponse> {
    if !state.config.features.enable_seed {
        return Err(AppError::not_found("Seeding is disabled"));
    }

    tracing::warn!("{} is seeding sample data", staff.email);
    let report = seed::run(&state.db, Utc::now().date_naive()).await?;

    state.cache.invalidate_marquees().await;
    for marquee in Marquee::find_all(&state.db).await? {
        state.cache.invalidate_availability(marquee.id).await;
    }

    Ok((StatusCode::CREATED, Json(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_defaults_to_name() {
        assert_eq!(resolve_slug(None, "Premium 8x12 Marquee").unwrap(), "premium-8x12-marquee");
        assert_eq!(resolve_slug(Some("Big Top"), "ignored").unwrap(), "big-top");
        assert!(resolve_slug(Some("!!!"), "Name").is_err());
    }

    #[test]
    fn status_filter_parses_lowercase() {
        let q: BookingsQuery = serde_urlencoded::from_str("status=confirmed").unwrap();
        assert_eq!(q.status, Some(BookingStatus::Confirmed));
        let q: BookingsQuery = serde_urlencoded::from_str("").unwrap();
        assert!(q.status.is_none());
    }
}
