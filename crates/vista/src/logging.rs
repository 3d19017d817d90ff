//! Tracing subscriber setup for the `vista` binary.
//!
//! The filter is built from, in order of precedence: `RUST_LOG`, the
//! `--verbose` flag, then `logging.level` from the config file.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vista_core::config::{LoggingConfig, LOG_LEVELS};

/// Resolved subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub directive: String,
    pub json: bool,
}

impl LogSettings {
    /// Combine the `[logging]` section with CLI overrides.
    ///
    /// `--verbose` raises the level to at least `debug` but never lowers a
    /// configured `trace`. Unknown levels fall back to `info`.
    pub fn resolve(config: &LoggingConfig, verbose: bool, json_override: bool) -> Self {
        let configured = config.level.to_ascii_lowercase();
        let level = if LOG_LEVELS.contains(&configured.as_str()) {
            configured
        } else {
            "info".to_string()
        };
        let level = if verbose && level != "trace" {
            "debug".to_string()
        } else {
            level
        };

        // Dependencies stay at warn unless the user asked for trace.
        let directive = if level == "trace" {
            level
        } else {
            format!("warn,vista={level},vista_core={level}")
        };

        Self {
            directive,
            json: json_override || config.format == "json",
        }
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries command output.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.directive));

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(config: &vista_core::Config, verbose: bool, json_logs: bool) {
    init(&LogSettings::resolve(&config.logging, verbose, json_logs));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, format: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_configured_level_is_kept() {
        let settings = LogSettings::resolve(&logging("warn", "pretty"), false, false);
        assert_eq!(settings.directive, "warn,vista=warn,vista_core=warn");
        assert!(!settings.json);

        let settings = LogSettings::resolve(&logging("Error", "pretty"), false, false);
        assert_eq!(settings.directive, "warn,vista=error,vista_core=error");
    }

    #[test]
    fn test_verbose_raises_to_debug_but_keeps_trace() {
        let settings = LogSettings::resolve(&logging("error", "pretty"), true, false);
        assert_eq!(settings.directive, "warn,vista=debug,vista_core=debug");

        let settings = LogSettings::resolve(&logging("trace", "pretty"), true, false);
        assert_eq!(settings.directive, "trace");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let settings = LogSettings::resolve(&logging("loud", "pretty"), false, false);
        assert_eq!(settings.directive, "warn,vista=info,vista_core=info");
    }

    #[test]
    fn test_json_from_config_or_flag() {
        assert!(LogSettings::resolve(&logging("info", "json"), false, false).json);
        assert!(LogSettings::resolve(&logging("info", "pretty"), false, true).json);
    }
}
