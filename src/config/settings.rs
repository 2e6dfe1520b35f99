//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_PAYMENT_CURRENCY, DEFAULT_PAYPAL_ACTION_URL,
    DEFAULT_PAYPAL_RECEIVER_EMAIL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_TTL_SECONDS, DEFAULT_SITE_URL, MIN_SESSION_SECRET_LENGTH,
    SESSION_BACKEND_MEMORY, SESSION_BACKEND_REDIS,
};
use crate::errors::{AppError, AppResult};

/// Where session data is kept between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

impl SessionBackend {
    fn parse(value: &str) -> AppResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            SESSION_BACKEND_REDIS => Ok(Self::Redis),
            SESSION_BACKEND_MEMORY => Ok(Self::Memory),
            other => Err(AppError::internal(format!(
                "Unknown SESSION_BACKEND '{}', expected 'redis' or 'memory'",
                other
            ))),
        }
    }
}

/// Payment provider settings
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Business account receiving the payment
    pub receiver_email: String,
    /// Form action the browser posts to
    pub action_url: String,
    /// ISO currency code
    pub currency: String,
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub session_backend: SessionBackend,
    session_secret: String,
    pub session_ttl_seconds: u64,
    pub server_host: String,
    pub server_port: u16,
    pub site_url: String,
    pub payment: PaymentSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("session_backend", &self.session_backend)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("site_url", &self.site_url)
            .field("payment", &self.payment)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if SESSION_SECRET is missing in a release build, is too short,
    /// or if SESSION_BACKEND names an unknown backend.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("SESSION_SECRET not set, using insecure default for development");
                "dev-session-secret-minimum-32-chars".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "SESSION_SECRET environment variable must be set in production",
                ))
            }
        };

        Self::builder(session_secret)?
            .with_env()
            .map(|config| config.normalized())
    }

    /// Build a configuration with defaults for every setting but the secret.
    ///
    /// # Errors
    /// Fails if the secret is shorter than the minimum length.
    pub fn builder(session_secret: impl Into<String>) -> AppResult<Self> {
        let session_secret = session_secret.into();
        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            session_backend: SessionBackend::Redis,
            session_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            site_url: DEFAULT_SITE_URL.to_string(),
            payment: PaymentSettings {
                receiver_email: DEFAULT_PAYPAL_RECEIVER_EMAIL.to_string(),
                action_url: DEFAULT_PAYPAL_ACTION_URL.to_string(),
                currency: DEFAULT_PAYMENT_CURRENCY.to_string(),
            },
        })
    }

    fn with_env(mut self) -> AppResult<Self> {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(url) = env::var("REDIS_URL") {
            self.redis_url = url;
        }
        if let Ok(backend) = env::var("SESSION_BACKEND") {
            self.session_backend = SessionBackend::parse(&backend)?;
        }
        if let Some(ttl) = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.session_ttl_seconds = ttl;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server_host = host;
        }
        if let Some(port) = env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()) {
            self.server_port = port;
        }
        if let Ok(site) = env::var("SITE_URL") {
            self.site_url = site;
        }
        if let Ok(email) = env::var("PAYPAL_RECEIVER_EMAIL") {
            self.payment.receiver_email = email;
        }
        if let Ok(action) = env::var("PAYPAL_ACTION_URL") {
            self.payment.action_url = action;
        }
        if let Ok(currency) = env::var("PAYMENT_CURRENCY") {
            self.payment.currency = currency;
        }
        Ok(self)
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.site_url.trim_end_matches('/').len();
        self.site_url.truncate(trimmed);
        self
    }

    /// Get session secret bytes for signing session cookies.
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Absolute URL for a path on this site.
    pub fn site_link(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_short_secret() {
        assert!(Config::builder("short").is_err());
    }

    #[test]
    fn test_site_link_joins_paths() {
        let mut config = Config::builder("a-session-secret-that-is-long-enough").unwrap();
        config.site_url = "https://shop.example.com/".to_string();
        let config = config.normalized();
        assert_eq!(
            config.site_link("/order/confirm/"),
            "https://shop.example.com/order/confirm/"
        );
    }

    #[test]
    fn test_session_backend_parse() {
        assert_eq!(SessionBackend::parse("Redis").unwrap(), SessionBackend::Redis);
        assert_eq!(SessionBackend::parse("memory").unwrap(), SessionBackend::Memory);
        assert!(SessionBackend::parse("files").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::builder("a-session-secret-that-is-long-enough").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("a-session-secret"));
    }
}
