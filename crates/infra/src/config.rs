use chrono::Duration;
use chrono_tz::Tz;
use consultation_booking_domain::BookingRules;
use std::{fmt::Display, str::FromStr};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Region every expert schedule is expressed in
    pub timezone: Tz,
    /// Limits for booked time slots
    pub booking_rules: BookingRules,
    /// How long memoized availability answers are kept
    pub availability_cache_ttl: std::time::Duration,
    /// How long an admission lock is held before it expires on its own.
    /// Must be longer than the slowest admission.
    pub admission_lock_ttl: std::time::Duration,
    /// Deadline for every single storage, cache or lock call
    pub operation_timeout: std::time::Duration,
    pub database: DatabaseConfig,
    /// How often bookings whose session is over are marked as missed
    pub missed_bookings_sweep_interval: std::time::Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: std::time::Duration,
}

impl Config {
    pub fn new() -> Self {
        let port = env_or("PORT", 5000usize);
        let timezone = env_or("REGION_TIMEZONE", chrono_tz::Asia::Ho_Chi_Minh);

        let booking_rules = BookingRules {
            min_duration: Duration::minutes(env_or("BOOKING_MIN_DURATION_MINUTES", 15i64)),
            max_duration: Duration::minutes(env_or("BOOKING_MAX_DURATION_MINUTES", 240i64)),
            granularity: Duration::minutes(env_or("BOOKING_SLOT_GRANULARITY_MINUTES", 15i64)),
            max_lead: Duration::days(env_or("BOOKING_MAX_LEAD_DAYS", 180i64)),
            cancel_lead: Duration::minutes(env_or("BOOKING_CANCEL_LEAD_MINUTES", 60i64)),
        };

        Self {
            port,
            timezone,
            booking_rules,
            availability_cache_ttl: secs(env_or("AVAILABILITY_CACHE_TTL_SECS", 3600u64)),
            admission_lock_ttl: secs(env_or("ADMISSION_LOCK_TTL_SECS", 300u64)),
            operation_timeout: std::time::Duration::from_millis(env_or(
                "OPERATION_TIMEOUT_MILLIS",
                5000u64,
            )),
            database: DatabaseConfig {
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 25u32),
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", 5u32),
                max_lifetime: secs(env_or("DATABASE_MAX_LIFETIME_SECS", 300u64)),
            },
            missed_bookings_sweep_interval: secs(env_or(
                "MISSED_BOOKINGS_SWEEP_INTERVAL_SECS",
                300u64,
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn secs(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

/// Reads and parses an env var, falling back to `default` when it is
/// missing or malformed
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}
