use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::booking::{BookingSummary, CreateBookingRequest};
use crate::services::booking::BookingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{booking_number}", get(get_booking_summary))
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<impl IntoResponse> {
    let service = BookingService::new(&state.cache, &state.config.booking);
    let confirmation = service.submit(req, Utc::now().date_naive()).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

// GET /api/bookings/{booking_number}
async fn get_booking_summary(
    State(state): State<Arc<AppState>>,
    Path(booking_number): Path<String>,
) -> AppResult<Json<BookingSummary>> {
    crate::models::Booking::find_summary(&state.db, booking_number.trim())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Booking not found"))
}
