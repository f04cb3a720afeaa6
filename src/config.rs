//! Application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `ENERGY__<SECTION>__<KEY>` environment variables, and finally the
//! conventional `DATABASE_URL` and `JWT_SECRET` variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::validation::validate_currency_code;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub tariff: TariffSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    /// PostgreSQL URL; the in-memory store is used when absent
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Price and emission policy used by the calculator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TariffSettings {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Price per kWh for the highest subsidy tier
    #[serde(default = "default_rate_high")]
    pub rate_high: f64,

    #[serde(default = "default_rate_medium")]
    pub rate_medium: f64,

    /// Price per kWh for the lowest subsidy tier
    #[serde(default = "default_rate_low")]
    pub rate_low: f64,

    /// Grid emission factor in kg CO2 per kWh
    #[serde(default = "default_emission_factor")]
    pub emission_factor_kg_per_kwh: f64,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        let default_path = Path::new("config.toml");
        match config_file {
            Some(path) => settings = settings.add_source(config::File::from(path)),
            None if default_path.exists() => {
                settings = settings.add_source(config::File::from(default_path))
            }
            None => {}
        }

        settings = settings
            .add_source(
                config::Environment::with_prefix("ENERGY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?;

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "JWT secret is required (set JWT_SECRET or ENERGY__AUTH__JWT_SECRET)".to_string(),
            ));
        }

        self.auth.token_ttl()?;
        self.tariff.validate()
    }
}

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

impl AuthSettings {
    /// Token lifetime as a duration, bounded to `1..=MAX_TOKEN_TTL_HOURS` hours
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if self.token_ttl_hours <= 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::Invalid(format!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        Ok(chrono::Duration::hours(self.token_ttl_hours))
    }
}

impl TariffSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_currency_code(&self.currency).map_err(|e| {
            ConfigError::Invalid(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid currency".to_string()),
            )
        })?;

        let values = [
            ("tariff.rate_high", self.rate_high),
            ("tariff.rate_medium", self.rate_medium),
            ("tariff.rate_low", self.rate_low),
            (
                "tariff.emission_factor_kg_per_kwh",
                self.emission_factor_kg_per_kwh,
            ),
        ];
        for (key, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number",
                    key
                )));
            }
        }

        if self.rate_high > self.rate_medium || self.rate_medium > self.rate_low {
            return Err(ConfigError::Invalid(
                "tariff rates must satisfy rate_high <= rate_medium <= rate_low".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl Default for TariffSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            rate_high: default_rate_high(),
            rate_medium: default_rate_medium(),
            rate_low: default_rate_low(),
            emission_factor_kg_per_kwh: default_emission_factor(),
        }
    }
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_currency() -> String {
    "ARS".to_string()
}

fn default_rate_high() -> f64 {
    40.0
}

fn default_rate_medium() -> f64 {
    75.0
}

fn default_rate_low() -> f64 {
    120.0
}

fn default_emission_factor() -> f64 {
    0.42
}
