pub mod admin;
pub mod availability;
pub mod bookings;
pub mod marquees;
pub mod search;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(marquees::routes())
        .merge(availability::routes())
        .merge(search::routes())
        .merge(bookings::routes())
        .merge(admin::routes())
}
