use chrono::NaiveDate;
use tracing::debug;

use crate::cache::CacheService;
use crate::models::availability::CalendarEntry;
use crate::services::availability::records_between;

impl CacheService {
    /// Calendar overrides for one marquee within `from..=to`, ordered by date.
    pub async fn get_calendar(
        &self,
        marquee_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, sqlx::Error> {
        let key = format!("availability:{}:{}:{}", marquee_id, from, to);

        if let Some(entries) = self.get_json::<Vec<CalendarEntry>>(&key).await {
            return Ok(entries);
        }

        let records = records_between(self.db(), marquee_id, from, to).await?;
        let entries: Vec<CalendarEntry> = records.iter().map(CalendarEntry::from).collect();
        self.set_json(&key, &entries).await;
        Ok(entries)
    }

    pub async fn invalidate_availability(&self, marquee_id: i64) {
        self.delete_pattern(&format!("availability:{}:*", marquee_id)).await;
        debug!("Invalidated availability cache for marquee {}", marquee_id);
    }
}
