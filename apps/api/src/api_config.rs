use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chapterdesk_application::DEFAULT_TOKEN_TTL_MINUTES;
use chapterdesk_core::AppError;
use chapterdesk_domain::RoleTaxonomy;
use tracing_subscriber::EnvFilter;

/// Persistence backend selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub store_backend: StoreBackend,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub role_taxonomy_path: Option<String>,
    pub token_ttl_minutes: i64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let store_backend = match optional_env("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };
        if migrate_only && store_backend == StoreBackend::Memory {
            return Err(AppError::Validation(
                "the migrate command requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_env("API_PORT", 3001_u16)?;
        let token_ttl_minutes = parse_env("TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        if token_ttl_minutes <= 0 {
            return Err(AppError::Validation(
                "TOKEN_TTL_MINUTES must be positive".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            store_backend,
            frontend_url,
            api_host,
            api_port,
            role_taxonomy_path: optional_env("ROLE_TAXONOMY_PATH"),
            token_ttl_minutes,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Reads the role taxonomy file, or falls back to the built-in table.
    pub fn role_taxonomy(&self) -> Result<RoleTaxonomy, AppError> {
        let Some(path) = self.role_taxonomy_path.as_deref() else {
            return Ok(RoleTaxonomy::default());
        };

        let document = fs::read_to_string(path).map_err(|error| {
            AppError::Validation(format!("failed to read ROLE_TAXONOMY_PATH '{path}': {error}"))
        })?;
        RoleTaxonomy::from_json_str(&document)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, StoreBackend};

    fn memory_config() -> ApiConfig {
        ApiConfig {
            migrate_only: false,
            store_backend: StoreBackend::Memory,
            frontend_url: "http://localhost:3000".to_owned(),
            api_host: "127.0.0.1".to_owned(),
            api_port: 3001,
            role_taxonomy_path: None,
            token_ttl_minutes: 60,
        }
    }

    #[test]
    fn socket_address_rejects_invalid_host() {
        let mut config = memory_config();
        assert!(config.socket_address().is_ok());

        config.api_host = "not-a-host".to_owned();
        assert!(config.socket_address().is_err());
    }

    #[test]
    fn missing_taxonomy_file_is_a_validation_error() {
        let mut config = memory_config();
        assert!(config.role_taxonomy().is_ok());

        config.role_taxonomy_path = Some("/nonexistent/chapterdesk-taxonomy.json".to_owned());
        assert!(matches!(
            config.role_taxonomy(),
            Err(chapterdesk_core::AppError::Validation(_))
        ));
    }
}
