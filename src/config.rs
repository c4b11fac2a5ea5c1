use serde::Deserialize;
use tracing::warn;

/// Signing secret used when `JWT_SECRET` is unset outside production.
const DEV_JWT_SECRET: &str = "pharmalab-dev-secret-do-not-use-in-production";

/// Accepted token lifetimes, in minutes (up to one year).
pub const JWT_TTL_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=525_600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingSecret,
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            None | Some("") | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(s) => s,
            None if environment == Environment::Production => {
                return Err(ConfigError::MissingSecret)
            }
            None => {
                warn!("JWT_SECRET not set; using the development fallback secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "pharmalab".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "pharmalab-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", &lookup, 60 * 24 * 7)?,
        };
        if !JWT_TTL_MINUTES_RANGE.contains(&jwt.ttl_minutes) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_MINUTES",
                value: jwt.ttl_minutes.to_string(),
            });
        }

        Ok(Self {
            environment,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("APP_PORT", &lookup, 8080)?,
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 10)?,
            jwt,
        })
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}
