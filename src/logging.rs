//! Structured logging for the browser and CLI
//!
//! Logs go to stderr so they never mix with prompt text written to stdout.
//! Level and format come from `PROMPT_LIBRARY_LOG_*` environment variables;
//! the default level is `error`, which keeps normal runs quiet.

use anyhow::Result;
use std::env;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full EnvFilter string)
    pub level: String,
    pub format: LogFormat,
    pub colored: bool,
    /// Include file and line of each event
    pub with_location: bool,
    /// Emit span open/close events
    pub with_spans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            format: LogFormat::Pretty,
            colored: is_terminal::IsTerminal::is_terminal(&std::io::stderr()),
            with_location: false,
            with_spans: false,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    pub fn from_env() -> Self {
        let level = env::var("PROMPT_LIBRARY_LOG_LEVEL")
            .or_else(|_| env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "error".to_string());

        let format = match env::var("PROMPT_LIBRARY_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let colored = env_flag("PROMPT_LIBRARY_LOG_COLOR")
            .unwrap_or_else(|| is_terminal::IsTerminal::is_terminal(&std::io::stderr()));

        Self {
            level,
            format,
            colored,
            with_location: env_flag("PROMPT_LIBRARY_LOG_LOCATION").unwrap_or(false),
            with_spans: env_flag("PROMPT_LIBRARY_LOG_SPANS").unwrap_or(false),
        }
    }

    /// True when any logging variable is set
    pub fn requested() -> bool {
        [
            "PROMPT_LIBRARY_LOG_LEVEL",
            "LOG_LEVEL",
            "PROMPT_LIBRARY_LOG_FORMAT",
        ]
        .iter()
        .any(|name| env::var_os(name).is_some())
    }
}

/// Install the global subscriber
pub fn init_logging(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("error"));

    let span_events = if config.with_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.colored)
        .with_span_events(span_events)
        .with_file(config.with_location)
        .with_line_number(config.with_location);

    match config.format {
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize JSON logging: {}", e))?,
        LogFormat::Pretty => subscriber
            .pretty()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize pretty logging: {}", e))?,
        LogFormat::Compact => subscriber
            .compact()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize compact logging: {}", e))?,
    }

    info!(
        level = %config.level,
        format = ?config.format,
        colored = config.colored,
        "Logging initialized"
    );

    Ok(())
}

pub fn log_command_execution<T>(command_name: &str, duration_ms: u64, result: &Result<T>) {
    let span = tracing::info_span!("command_execution", command = command_name, duration_ms);
    let _enter = span.enter();

    match result {
        Ok(_) => info!(command = command_name, duration_ms, "Command completed"),
        Err(e) => error!(
            command = command_name,
            duration_ms,
            error = %e,
            "Command failed"
        ),
    }
}

/// Record one request against the hosted database
pub fn log_fetch_operation(operation: &str, prompt_id: Option<&str>, success: bool, duration_ms: u64) {
    let span = tracing::info_span!(
        "fetch_operation",
        operation,
        prompt_id,
        success,
        duration_ms
    );
    let _enter = span.enter();

    if success {
        debug!(operation, prompt_id, duration_ms, "Fetch completed");
    } else {
        warn!(operation, prompt_id, duration_ms, "Fetch failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn init_test_logging() {
        INIT.call_once(|| {
            let config = LogConfig {
                level: "debug".to_string(),
                format: LogFormat::Compact,
                colored: false,
                with_location: false,
                with_spans: false,
            };
            let _ = init_logging(config);
        });
    }

    #[test]
    fn test_log_config_from_env() {
        env::set_var("PROMPT_LIBRARY_LOG_LEVEL", "debug");
        env::set_var("PROMPT_LIBRARY_LOG_FORMAT", "json");
        env::set_var("PROMPT_LIBRARY_LOG_COLOR", "false");

        let config = LogConfig::from_env();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.colored);
        assert!(LogConfig::requested());

        env::remove_var("PROMPT_LIBRARY_LOG_LEVEL");
        env::remove_var("PROMPT_LIBRARY_LOG_FORMAT");
        env::remove_var("PROMPT_LIBRARY_LOG_COLOR");
    }

    #[test]
    fn test_default_level_is_error() {
        assert_eq!(LogConfig::default().level, "error");
        assert_eq!(LogConfig::default().format, LogFormat::Pretty);
    }

    #[test]
    fn test_command_execution_logging() {
        init_test_logging();

        let result: Result<()> = Ok(());
        log_command_execution("ls", 100, &result);

        let result: Result<()> = Err(anyhow::anyhow!("network down"));
        log_command_execution("ls", 200, &result);
    }

    #[test]
    fn test_fetch_operation_logging() {
        init_test_logging();

        log_fetch_operation("get_prompt", Some("42"), true, 50);
        log_fetch_operation("list_prompts", None, false, 1200);
    }
}
