use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::models::Booking;
use crate::AppState;

/// Periodically closes out confirmed bookings whose event has ended.
pub struct CompletionService {
    state: Arc<AppState>,
}

impl CompletionService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn run_once(&self) -> usize {
        match Booking::complete_finished(&self.state.db, Utc::now()).await {
            Ok(numbers) if numbers.is_empty() => 0,
            Ok(numbers) => {
                info!("Marked {} bookings completed: {}", numbers.len(), numbers.join(", "));
                numbers.len()
            }
            Err(e) => {
                error!("Completion sweep failed: {:?}", e);
                0
            }
        }
    }

    pub fn spawn(self, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::task::spawn(async move {
            loop {
                self.run_once().await;
                tokio::time::sleep(every).await;
            }
        })
    }
}
