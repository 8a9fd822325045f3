use crate::cache::CacheService;
use crate::models::Marquee;
use tracing::info;

const ACTIVE_MARQUEES_KEY: &str = "marquees:active";

impl CacheService {
    /// Active marquees, cheapest first.
    pub async fn get_active_marquees(&self) -> Result<Vec<Marquee>, sqlx::Error> {
        if let Some(marquees) = self.get_json::<Vec<Marquee>>(ACTIVE_MARQUEES_KEY).await {
            return Ok(marquees);
        }

        let marquees: Vec<Marquee> = Marquee::find_active(self.db())
            .await?
            .into_iter()
            .map(Marquee::public)
            .collect();
        self.set_json(ACTIVE_MARQUEES_KEY, &marquees).await;
        Ok(marquees)
    }

    pub async fn get_active_marquee_by_slug(&self, slug: &str) -> Result<Option<Marquee>, sqlx::Error> {
        let marquees = self.get_active_marquees().await?;
        Ok(marquees.into_iter().find(|m| m.slug == slug))
    }

    pub async fn get_active_marquee(&self, id: i64) -> Result<Option<Marquee>, sqlx::Error> {
        let marquees = self.get_active_marquees().await?;
        Ok(marquees.into_iter().find(|m| m.id == id))
    }

    pub async fn invalidate_marquees(&self) {
        self.delete_keys(vec![ACTIVE_MARQUEES_KEY.to_string()]).await;
        info!("Invalidated marquee catalog cache");
    }
}
