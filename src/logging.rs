// src/logging.rs

use crate::constants::{APP_DIR_NAME, DEFAULT_LOG_LEVEL, STDERR_LOG_LEVEL};
use crate::errors::{ChatError, ChatResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use std::path::PathBuf;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Files under the given directory. Used while the terminal UI owns the screen.
    File(PathBuf),
    Stderr,
}

/// Default directory for log files, `<cache dir>/chatline`.
pub fn default_log_dir() -> ChatResult<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine cache directory"))?;
    Ok(cache_dir.join(APP_DIR_NAME))
}

impl LogTarget {
    /// Level used when none is configured.
    pub fn default_level(&self) -> &'static str {
        match self {
            LogTarget::File(_) => DEFAULT_LOG_LEVEL,
            LogTarget::Stderr => STDERR_LOG_LEVEL,
        }
    }
}

/// Starts the global logger. The returned handle must be kept alive for the
/// lifetime of the program or buffered output is lost.
///
/// `RUST_LOG` overrides `level` when set. Without either, the target's
/// default level applies.
pub fn init_logging(level: Option<&str>, target: LogTarget) -> ChatResult<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level.unwrap_or(target.default_level()))?;
    let handle = match target {
        LogTarget::File(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename(APP_DIR_NAME))
            .write_mode(WriteMode::BufferAndFlush)
            .start()?,
        LogTarget::Stderr => logger.log_to_stderr().start()?,
    };
    Ok(handle)
}

/// Logs one exchange with the chat endpoint.
pub fn log_api_call(call: &ApiCallLog) {
    let status = call
        .response_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    log::info!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        call.timestamp.to_rfc3339(),
        call.endpoint,
        call.request_summary,
        status,
        call.response_time_ms
    );
}

/// Shortens a message for the API call log.
pub fn summarize_request(message: &str) -> String {
    const MAX_CHARS: usize = 60;
    let mut summary: String = message.chars().take(MAX_CHARS).collect();
    if message.chars().count() > MAX_CHARS {
        summary.push_str("...");
    }
    format!("message ({} chars): \"{}\"", message.chars().count(), summary)
}
