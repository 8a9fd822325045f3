use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::config::AdminConfig;
use crate::models::customer::normalize_email;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }

    /// Creates the configured staff account if it is missing. Existing
    /// accounts keep their password.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> anyhow::Result<()> {
        let (Some(email), Some(password)) = (&admin.email, &admin.password) else {
            info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping staff bootstrap");
            return Ok(());
        };

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let created = sqlx::query(
            "INSERT INTO staff (email, password_hash, name)
             VALUES ($1, $2, 'Administrator')
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(normalize_email(email))
        .bind(hash)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if created > 0 {
            info!("Created staff account {}", email);
        }
        Ok(())
    }
}
