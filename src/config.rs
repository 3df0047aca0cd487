use std::{env, time::Duration};

const DEFAULT_PAYMENT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_CONCURRENCY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub payment_http_timeout: Duration,
    /// Overrides the Stripe endpoint (stripe-mock, staging proxies).
    pub stripe_api_base: Option<String>,
    /// Overrides the PayPal endpoint chosen from each tenant's mode.
    pub paypal_api_base: Option<String>,
    pub max_body_bytes: usize,
    pub concurrency_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let payment_http_timeout = env::var("PAYMENT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_PAYMENT_HTTP_TIMEOUT_SECS));
        let stripe_api_base = env::var("STRIPE_API_BASE").ok().filter(|s| !s.is_empty());
        let paypal_api_base = env::var("PAYPAL_API_BASE").ok().filter(|s| !s.is_empty());
        let max_body_bytes = env_usize("MAX_BODY_BYTES").unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let concurrency_limit =
            env_usize("CONCURRENCY_LIMIT").unwrap_or(DEFAULT_CONCURRENCY_LIMIT);
        Ok(Self {
            port,
            database_url,
            host,
            payment_http_timeout,
            stripe_api_base,
            paypal_api_base,
            max_body_bytes,
            concurrency_limit,
        })
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.payment_http_timeout)
            .build()?;
        Ok(client)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
            payment_http_timeout: Duration::from_secs(5),
            stripe_api_base: None,
            paypal_api_base: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}
