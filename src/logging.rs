use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{env_or, env_or_bool};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl LogConfig {
    /// Reads only the logging keys, so tracing can be installed before the
    /// rest of the configuration is parsed.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env_or("RUST_LOG", &defaults.log_level),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", defaults.enable_file_logs),
            log_dir: env_or("LOG_DIR", &defaults.log_dir),
        }
    }
}

/// Installs the global subscriber: stdout always, plus daily-rotated JSON
/// files when enabled. A subscriber that is already set is left in place.
pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let result = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("quiz-inference")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&config.log_dir)
            .expect("Failed to create rolling file appender");
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    // Tests install the subscriber repeatedly; only a first-time failure is fatal.
    if let Err(e) = result {
        if !e.to_string().contains("already been set") {
            panic!("Failed to initialize tracing: {e}");
        }
    }
}
