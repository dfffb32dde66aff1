//! Configuration management for Idlink Core
//!
//! All settings are read once at startup. Missing credentials are a fatal
//! configuration error, never a per-request one.

use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Auth provider admin API configuration
    pub provider: ProviderConfig,
    /// Direct identity store configuration
    pub identity_store: IdentityStoreConfig,
    /// Session token verification
    pub jwt: JwtConfig,
    /// Unlink orchestration settings
    pub unlink: UnlinkConfig,
    /// Logging, metrics and tracing
    pub telemetry: TelemetryConfig,
}

#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL of the auth admin API (e.g., https://project.example.co/auth/v1)
    pub url: String,
    /// Service-level credential. Grants administrative access to the provider.
    pub service_key: String,
}

#[derive(Clone)]
pub struct IdentityStoreConfig {
    /// Postgres URL with elevated rights on the provider's identity schema
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct UnlinkConfig {
    /// Upper bound for each network step (directory fetch, each removal strategy)
    pub step_timeout_ms: u64,
    /// Whether the privileged endpoint strategy runs before the store fallback
    pub privileged_endpoint_enabled: bool,
}

impl UnlinkConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Pool acquire bound for the store strategy. Kept below the step timeout
    /// so a saturated pool surfaces as a pool timeout inside the step.
    pub fn store_acquire_timeout(&self) -> Duration {
        self.step_timeout() * 3 / 4
    }
}

impl Default for UnlinkConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: 10_000,
            privileged_endpoint_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "text" or "json"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub tracing_enabled: bool,
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            metrics_enabled: true,
            tracing_enabled: false,
            otlp_endpoint: None,
            service_name: "idlink-core".to_string(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for IdentityStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStoreConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("audience", &self.audience)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(default)
        };

        let step_timeout_ms: u64 = get("UNLINK_STEP_TIMEOUT_MS", "10000")
            .parse()
            .context("Invalid UNLINK_STEP_TIMEOUT_MS")?;
        if step_timeout_ms == 0 {
            bail!("UNLINK_STEP_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            http_host: get("HTTP_HOST", "0.0.0.0"),
            http_port: get("HTTP_PORT", "8080")
                .parse()
                .context("Invalid HTTP_PORT")?,
            provider: ProviderConfig {
                url: required(&var, "AUTH_PROVIDER_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                service_key: required(&var, "AUTH_PROVIDER_SERVICE_KEY")?,
            },
            identity_store: IdentityStoreConfig {
                url: required(&var, "IDENTITY_STORE_DATABASE_URL")?,
                max_connections: get("IDENTITY_STORE_MAX_CONNECTIONS", "5")
                    .parse()
                    .unwrap_or(5),
                min_connections: get("IDENTITY_STORE_MIN_CONNECTIONS", "1")
                    .parse()
                    .unwrap_or(1),
            },
            jwt: JwtConfig {
                secret: required(&var, "JWT_SECRET")?,
                audience: get("JWT_AUDIENCE", "authenticated"),
            },
            unlink: UnlinkConfig {
                step_timeout_ms,
                privileged_endpoint_enabled: flag("UNLINK_PRIVILEGED_ENDPOINT_ENABLED", true),
            },
            telemetry: TelemetryConfig {
                log_format: get("LOG_FORMAT", "text"),
                metrics_enabled: flag("METRICS_ENABLED", true),
                tracing_enabled: flag("OTEL_TRACING_ENABLED", false),
                otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
                service_name: get("OTEL_SERVICE_NAME", "idlink-core"),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn required<F>(var: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} is required", key),
    }
}
