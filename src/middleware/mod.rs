use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{customer::normalize_email, Staff};

/// Authenticated staff member, resolved from HTTP Basic credentials.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Splits a `Basic` Authorization header into email and password.
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (email, password) = credentials.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

impl FromRequestParts<Arc<crate::AppState>> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (email, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_auth)
            .ok_or(AppError::Unauthorized)?;

        let staff = Staff::find_active_by_email(&normalize_email(&email), &state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // bcrypt verification blocks the thread
        let (staff, valid) = tokio::task::spawn_blocking(move || {
            let valid = staff.verify_password(&password);
            (staff, valid)
        })
        .await
        .map_err(|e| AppError::internal(format!("password check panicked: {}", e)))?;

        if !valid {
            tracing::warn!("Rejected staff login for {}", staff.email);
            return Err(AppError::Unauthorized);
        }

        sqlx::query("UPDATE staff SET last_logged_in = NOW() WHERE id = $1")
            .bind(staff.id)
            .execute(&state.db.pool)
            .await
            .ok();

        Ok(StaffUser {
            id: staff.id,
            email: staff.email,
            name: staff.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_credentials() {
        let header = format!("Basic {}", general_purpose::STANDARD.encode("admin@example.com:s3cr:et"));
        assert_eq!(
            parse_basic_auth(&header),
            Some(("admin@example.com".to_string(), "s3cr:et".to_string()))
        );
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(parse_basic_auth("Bearer abc"), None);
        assert_eq!(parse_basic_auth("Basic !!!"), None);
        let no_colon = format!("Basic {}", general_purpose::STANDARD.encode("admin"));
        assert_eq!(parse_basic_auth(&no_colon), None);
    }
}
