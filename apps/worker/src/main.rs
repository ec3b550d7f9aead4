//! Due-date reminder worker.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cmms_application::{NotificationDelivery, ReminderService};
use cmms_core::{AppError, AppResult};
use cmms_infrastructure::{
    FanOutNotificationDelivery, PostgresNotificationRepository, PostgresWorkOrderRepository,
    WebhookNotificationDelivery,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct WebhookConfig {
    url: String,
    max_attempts: u8,
    backoff_ms: u64,
    timeout_ms: u64,
}

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    poll_interval_seconds: u64,
    webhook: Option<WebhookConfig>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let reminder_service = build_reminder_service(pool, config.webhook.as_ref());

    info!(
        poll_interval_seconds = config.poll_interval_seconds,
        webhook_enabled = config.webhook.is_some(),
        "cmms-worker started"
    );

    loop {
        let today = Utc::now().date_naive();
        match reminder_service.dispatch_due_reminders(today).await {
            Ok(summary) => {
                info!(
                    %today,
                    scanned = summary.scanned,
                    sent = summary.sent,
                    already_sent = summary.already_sent,
                    failed = summary.failed,
                    "due reminder pass finished"
                );
            }
            Err(error) => {
                warn!(%today, error = %error, "due reminder pass failed");
            }
        }

        tokio::time::sleep(Duration::from_secs(config.poll_interval_seconds)).await;
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_reminder_service(pool: PgPool, webhook: Option<&WebhookConfig>) -> ReminderService {
    let inbox = Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let mut delivery = FanOutNotificationDelivery::new().with_channel("inbox", inbox.clone());

    if let Some(webhook) = webhook {
        delivery = delivery.with_channel(
            "webhook",
            Arc::new(WebhookNotificationDelivery::new(
                reqwest::Client::new(),
                webhook.url.clone(),
                webhook.max_attempts,
                webhook.backoff_ms,
                Duration::from_millis(webhook.timeout_ms),
            )),
        );
    }

    let delivery: Arc<dyn NotificationDelivery> = Arc::new(delivery);
    ReminderService::new(
        Arc::new(PostgresWorkOrderRepository::new(pool)),
        inbox,
        delivery,
    )
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let poll_interval_seconds =
            parse_or_default(&lookup, "REMINDER_POLL_INTERVAL_SECONDS", 3600_u64)?;

        if poll_interval_seconds == 0 {
            return Err(AppError::Validation(
                "REMINDER_POLL_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let webhook = match lookup("NOTIFICATION_WEBHOOK_URL")
            .filter(|value| !value.trim().is_empty())
        {
            Some(url) => {
                let timeout_ms =
                    parse_or_default(&lookup, "NOTIFICATION_WEBHOOK_TIMEOUT_MS", 10_000_u64)?;
                if timeout_ms == 0 {
                    return Err(AppError::Validation(
                        "NOTIFICATION_WEBHOOK_TIMEOUT_MS must be greater than zero".to_owned(),
                    ));
                }
                Some(WebhookConfig {
                    url,
                    max_attempts: parse_or_default(
                        &lookup,
                        "NOTIFICATION_WEBHOOK_MAX_ATTEMPTS",
                        3_u8,
                    )?,
                    backoff_ms: parse_or_default(
                        &lookup,
                        "NOTIFICATION_WEBHOOK_BACKOFF_MS",
                        250_u64,
                    )?,
                    timeout_ms,
                })
            }
            None => None,
        };

        Ok(Self {
            database_url,
            poll_interval_seconds,
            webhook,
        })
    }
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
