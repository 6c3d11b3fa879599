//! # Structured Logging Module
//!
//! Environment-aware structured logging for criteria construction and repository
//! execution. Output goes to the console, as JSON when `CRITERIA_LOG_FORMAT=json`.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = is_json_format();

        let registry = tracing_subscriber::registry().with(filter);
        let result = if json {
            registry
                .with(fmt::layer().with_target(true).with_level(true).json())
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(true),
                )
                .try_init()
        };

        // A global subscriber may already be installed by the host application
        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("CRITERIA_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn is_json_format() -> bool {
    std::env::var("CRITERIA_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for criteria construction and combination
pub fn log_criteria_operation(operation: &str, entity: &str, details: Option<&str>) {
    tracing::debug!(
        operation = %operation,
        entity = %entity,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CRITERIA_OPERATION"
    );
}

/// Log structured data for repository executions
pub fn log_repository_operation(operation: &str, entity: &str, rows: u64, status: &str) {
    tracing::debug!(
        operation = %operation,
        entity = %entity,
        rows = rows,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "REPOSITORY_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
