// src/logging.rs

use crate::config::Config;
use crate::errors::{BeautiragError, BeautiragResult};
use crate::models::ApiCallLog;
use flexi_logger::{detailed_format, FileSpec, Logger, LoggerHandle};

/// Starts the file logger. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr. Keep the returned handle alive for the whole
/// run, dropping it flushes and stops logging.
pub fn init_logging(config: &Config) -> BeautiragResult<LoggerHandle> {
    let log_dir = config.resolved_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    Logger::try_with_env_or_str(&config.log_level)
        .and_then(|logger| {
            logger
                .log_to_file(FileSpec::default().directory(log_dir).basename("beautirag"))
                .format(detailed_format)
                .start()
        })
        .map_err(|e| BeautiragError::config_error(format!("Failed to start logger: {}", e)))
}

/// Renders an API call as a single log line.
pub fn format_api_call(log: &ApiCallLog) -> String {
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    )
}

/// Logs a backend call on the `api` target.
pub fn log_api_call(log: &ApiCallLog) {
    if log.response_status >= 400 || log.response_status == 0 {
        log::warn!(target: "api", "{}", format_api_call(log));
    } else {
        log::info!(target: "api", "{}", format_api_call(log));
    }
}
