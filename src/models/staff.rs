use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Staff {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub last_logged_in: Option<DateTime<Utc>>,
}

impl Staff {
    pub async fn find_active_by_email(
        email: &str,
        db: &crate::database::Database,
    ) -> Result<Option<Staff>, sqlx::Error> {
        sqlx::query_as::<_, Staff>(
            "SELECT id, email, password_hash, name, is_active, last_logged_in
             FROM staff
             WHERE email = $1 AND is_active = true",
        )
        .bind(email)
        .fetch_optional(&db.pool)
        .await
    }

    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}
