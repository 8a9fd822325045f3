use serde::Deserialize;
use std::env;

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub booking: BookingConfig,
    pub admin: AdminConfig,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub cache_ttl_seconds: u64,
}

// Pricing and window settings for availability, search and bookings
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub deposit_rate: f64,
    pub search_window_days: i64,
    pub availability_window_days: i64,
    pub max_booking_days: i64,
    pub completion_sweep_seconds: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            deposit_rate: 0.25,
            search_window_days: 90,
            availability_window_days: 90,
            max_booking_days: 730,
            completion_sweep_seconds: 3600,
        }
    }
}

// Staff account created on startup when it does not exist yet
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_seed: bool,
    pub enable_cache: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = BookingConfig::default();

        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", 8000),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "marquee_hire=debug,tower_http=debug".to_string()),
                log_format: parse_var("LOG_FORMAT", LogFormat::Pretty),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: parse_var("DB_POOL_SIZE", 10),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS", 300),
            },
            booking: BookingConfig {
                deposit_rate: parse_var("DEPOSIT_RATE", defaults.deposit_rate),
                search_window_days: parse_var("SEARCH_WINDOW_DAYS", defaults.search_window_days),
                availability_window_days: parse_var(
                    "AVAILABILITY_WINDOW_DAYS",
                    defaults.availability_window_days,
                ),
                max_booking_days: parse_var("MAX_BOOKING_DAYS", defaults.max_booking_days),
                completion_sweep_seconds: parse_var(
                    "COMPLETION_SWEEP_SECONDS",
                    defaults.completion_sweep_seconds,
                ),
            },
            admin: AdminConfig {
                email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
                password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            },
            features: FeatureFlags {
                enable_seed: parse_var("ENABLE_SEED", false),
                enable_cache: parse_var("ENABLE_CACHE", true),
            },
        }
    }
}

// Reads an optional variable, falling back to the default when unset.
// A value that is set but unparsable is a misconfiguration and aborts startup.
fn parse_var<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{} has an invalid value '{}': {}", key, raw, e)),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_values() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("MARQUEE_HIRE_TEST_UNSET_VARIABLE", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn booking_defaults_match_house_rules() {
        let defaults = BookingConfig::default();
        assert_eq!(defaults.deposit_rate, 0.25);
        assert_eq!(defaults.search_window_days, 90);
        assert_eq!(defaults.availability_window_days, 90);
        assert_eq!(defaults.max_booking_days, 730);
    }
}
