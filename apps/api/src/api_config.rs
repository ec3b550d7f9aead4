use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use cmms_core::AppError;
use tracing_subscriber::EnvFilter;

/// Where work orders, users and notifications are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres { database_url: String },
}

/// Outbound webhook channel settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
    pub max_attempts: u8,
    pub backoff_ms: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub storage: StorageBackend,
    pub webhook: Option<WebhookConfig>,
    pub seed_directory: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "memory".to_owned());
        let storage = match backend.as_str() {
            "memory" if !migrate_only => StorageBackend::Memory,
            "memory" | "postgres" => StorageBackend::Postgres {
                database_url: non_empty(&lookup, "DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let seed_directory = match lookup("DEV_SEED_DIRECTORY") {
            Some(value) => value.eq_ignore_ascii_case("true"),
            None => storage == StorageBackend::Memory,
        };

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            storage,
            webhook: webhook_config(&lookup)?,
            seed_directory,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn webhook_config(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<WebhookConfig>, AppError> {
    let Some(url) = lookup("NOTIFICATION_WEBHOOK_URL").filter(|value| !value.trim().is_empty())
    else {
        return Ok(None);
    };

    let max_attempts = match lookup("NOTIFICATION_WEBHOOK_MAX_ATTEMPTS") {
        Some(value) => value.parse::<u8>().map_err(|error| {
            AppError::Validation(format!("invalid NOTIFICATION_WEBHOOK_MAX_ATTEMPTS: {error}"))
        })?,
        None => 3,
    };
    let backoff_ms = match lookup("NOTIFICATION_WEBHOOK_BACKOFF_MS") {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid NOTIFICATION_WEBHOOK_BACKOFF_MS: {error}"))
        })?,
        None => 250,
    };
    let timeout_ms = match lookup("NOTIFICATION_WEBHOOK_TIMEOUT_MS") {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid NOTIFICATION_WEBHOOK_TIMEOUT_MS: {error}"))
        })?,
        None => 10_000,
    };
    if timeout_ms == 0 {
        return Err(AppError::Validation(
            "NOTIFICATION_WEBHOOK_TIMEOUT_MS must be greater than zero".to_owned(),
        ));
    }

    Ok(Some(WebhookConfig {
        url,
        max_attempts,
        backoff_ms,
        timeout_ms,
    }))
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(AppError::Validation(format!("{name} must not be empty"))),
        None => Err(AppError::Validation(format!("{name} is required"))),
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cmms_core::AppError;

    use super::{ApiConfig, StorageBackend};

    fn load(migrate_only: bool, values: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(migrate_only, |name| values.get(name).cloned())
    }

    #[test]
    fn defaults_to_seeded_memory_backend() {
        let Ok(config) = load(false, &[]) else {
            panic!("defaults should load");
        };

        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.seed_directory);
        assert!(config.webhook.is_none());
        assert_eq!(config.api_port, 3001);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let result = load(false, &[("STORAGE_BACKEND", "postgres")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn migrate_always_targets_postgres() {
        let Ok(config) = load(true, &[("DATABASE_URL", "postgres://localhost/cmms")]) else {
            panic!("migrate config should load");
        };

        assert!(matches!(config.storage, StorageBackend::Postgres { .. }));
        assert!(!config.seed_directory);
    }

    #[test]
    fn webhook_settings_are_parsed() {
        let Ok(config) = load(
            false,
            &[
                ("NOTIFICATION_WEBHOOK_URL", "https://hooks.example.test/cmms"),
                ("NOTIFICATION_WEBHOOK_MAX_ATTEMPTS", "5"),
            ],
        ) else {
            panic!("webhook config should load");
        };

        let Some(webhook) = config.webhook else {
            panic!("webhook should be configured");
        };
        assert_eq!(webhook.max_attempts, 5);
        assert_eq!(webhook.backoff_ms, 250);
        assert_eq!(webhook.timeout_ms, 10_000);
    }

    #[test]
    fn zero_webhook_timeout_is_rejected() {
        let result = load(
            false,
            &[
                ("NOTIFICATION_WEBHOOK_URL", "https://hooks.example.test/cmms"),
                ("NOTIFICATION_WEBHOOK_TIMEOUT_MS", "0"),
            ],
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = load(false, &[("STORAGE_BACKEND", "sqlite")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
