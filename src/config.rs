use std::env;
use std::time::Duration;

use crate::domain::retry::RetryPolicy;

/// Runtime configuration, read once from the environment at startup.
///
/// `DATABASE_URL`, `PAYMENT_GATEWAY_URL`/`PAYMENT_GATEWAY_TOKEN` and
/// `SHIPPING_PROVIDER_URL`/`SHIPPING_PROVIDER_TOKEN` are required;
/// everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub gateway_base_url: String,
    pub gateway_token: String,
    pub webhook_secret: Option<String>,
    pub shipping_base_url: String,
    pub shipping_token: String,
    pub webhook_lookup_attempts: u32,
    pub webhook_lookup_delay_ms: u64,
    pub tracking_poll_attempts: u32,
    pub tracking_poll_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            gateway_base_url: env::var("PAYMENT_GATEWAY_URL")
                .expect("PAYMENT_GATEWAY_URL must be set"),
            gateway_token: env::var("PAYMENT_GATEWAY_TOKEN")
                .expect("PAYMENT_GATEWAY_TOKEN must be set"),
            webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").ok(),
            shipping_base_url: env::var("SHIPPING_PROVIDER_URL")
                .expect("SHIPPING_PROVIDER_URL must be set"),
            shipping_token: env::var("SHIPPING_PROVIDER_TOKEN")
                .expect("SHIPPING_PROVIDER_TOKEN must be set"),
            webhook_lookup_attempts: env_or("WEBHOOK_LOOKUP_ATTEMPTS", 5),
            webhook_lookup_delay_ms: env_or("WEBHOOK_LOOKUP_DELAY_MS", 500),
            tracking_poll_attempts: env_or("TRACKING_POLL_ATTEMPTS", 3),
            tracking_poll_delay_ms: env_or("TRACKING_POLL_DELAY_MS", 2000),
        }
    }

    /// Retry policy for looking up an order row that a webhook references
    /// before checkout has committed it.
    pub fn webhook_lookup_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.webhook_lookup_attempts,
            Duration::from_millis(self.webhook_lookup_delay_ms),
        )
    }

    /// Retry policy for polling the shipping provider for tracking/label.
    pub fn tracking_poll_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.tracking_poll_attempts,
            Duration::from_millis(self.tracking_poll_delay_ms),
        )
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
