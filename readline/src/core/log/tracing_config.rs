// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing_core::LevelFilter;

/// Default log file name, used when no file name is given to
/// [`TracingConfig::new_file`].
pub const DEFAULT_LOG_FILE_NAME: &str = "readline_log_file_debug.log";

/// Configure the tracing logging to suit your needs. You can send the logs to:
/// 1. a file,
/// 2. stderr,
/// 3. both.
///
/// Stdout is deliberately not an option: while [`crate::Readline`] is reading a line it
/// owns stdout and tracks the exact rows it painted. Anything else written there would
/// make the cursor placement drift.
///
/// Use [`crate::try_initialize_logging_global()`] to install it.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Stderr,
    File(String /* log file path */),
    StderrAndFile(String /* log file path */),
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(file_path: Option<String>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                file_path.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn new_stderr() -> Self {
        Self {
            writer_config: WriterConfig::Stderr,
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_uses_default_name() {
        let config = TracingConfig::new_file(None);
        assert_eq!(
            config.get_writer_config(),
            WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string())
        );
        assert_eq!(config.get_level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_with_level_filter() {
        let config = TracingConfig::new_stderr().with_level_filter(LevelFilter::WARN);
        assert_eq!(config.get_writer_config(), WriterConfig::Stderr);
        assert_eq!(config.get_level_filter(), LevelFilter::WARN);
    }
}
