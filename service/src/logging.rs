use crate::config::{Config, LogFormat};
use chrono::{SecondsFormat, Utc};
use log::kv::{self, Key, VisitSource};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde_json::{Map, Value};
use simplelog::{self, ConfigBuilder};
use std::io::Write;

/// Modules to filter out from logging when not in Trace mode.
/// These are typically verbose dependencies that clutter normal log output.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "hyper", "hyper_util", "h2", "axum", "mio", "tokio"];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger with configuration based on the provided Config.
    ///
    /// When the log level is set to Trace, all logs including dependency logs are shown.
    /// For all other log levels, verbose dependency logs are filtered out.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let apply_filters = Self::should_filter_dependencies(config.log_level);

        match config.log_format {
            LogFormat::Json => {
                log::set_boxed_logger(Box::new(JsonLogger::new(config.log_level, apply_filters)))?;
                log::set_max_level(config.log_level);
                Ok(())
            }
            LogFormat::Text => simplelog::TermLogger::init(
                config.log_level,
                Self::build_log_config(apply_filters),
                simplelog::TerminalMode::Mixed,
                simplelog::ColorChoice::Auto,
            ),
        }
    }

    /// Determines whether dependency logging should be filtered.
    ///
    /// Returns `false` for Trace level (show all logs), `true` for all other levels.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Builds a simplelog Config with optional module filtering.
    ///
    /// When `apply_filters` is true, logs from noisy dependencies are suppressed.
    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

/// Writes each record to stdout as one JSON object: `ts`, `level`, `name`,
/// `msg`, followed by the record's structured key/values.
pub struct JsonLogger {
    level: LevelFilter,
    ignored_modules: &'static [&'static str],
}

impl JsonLogger {
    pub fn new(level: LevelFilter, apply_filters: bool) -> Self {
        Self {
            level,
            ignored_modules: if apply_filters { FILTERED_MODULES } else { &[] },
        }
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored_modules
            .iter()
            .any(|module| target.starts_with(module))
    }

    /// Renders a record as a single JSON line (without the trailing newline).
    /// Key/values never replace the four base fields.
    pub fn format_record(record: &Record) -> String {
        let mut line = Map::new();
        line.insert(
            "ts".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        line.insert(
            "level".to_string(),
            Value::String(record.level().as_str().to_lowercase()),
        );
        line.insert("name".to_string(), Value::String(record.target().to_string()));
        line.insert("msg".to_string(), Value::String(record.args().to_string()));

        // JsonFields never fails, so visiting can't either.
        let _ = record.key_values().visit(&mut JsonFields(&mut line));

        Value::Object(line).to_string()
    }
}

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && !self.is_ignored(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_record(record);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

struct JsonFields<'a>(&'a mut Map<String, Value>);

impl<'kvs> VisitSource<'kvs> for JsonFields<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        let value = serde_json::to_value(&value).unwrap_or_else(|_| Value::String(value.to_string()));
        self.0.entry(key.as_str()).or_insert(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn metadata(target: &str, level: Level) -> Metadata<'_> {
        Metadata::builder().target(target).level(level).build()
    }

    #[test]
    fn test_filtered_modules_contains_expected_dependencies() {
        for module in ["tower", "hyper", "axum"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_should_filter_dependencies_trace_level_disables_filtering() {
        // Trace level should NOT filter - we want to see everything for deep debugging
        assert!(
            !Logger::should_filter_dependencies(LevelFilter::Trace),
            "Trace level should disable filtering"
        );
    }

    #[test]
    fn test_should_filter_dependencies_other_levels_enable_filtering() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} level should enable filtering"
            );
        }
    }

    #[test]
    fn test_build_log_config_with_filters_does_not_panic() {
        let _config = Logger::build_log_config(true);
    }

    #[test]
    fn test_json_logger_respects_level_threshold() {
        let logger = JsonLogger::new(LevelFilter::Info, true);

        assert!(logger.enabled(&metadata("web::router", Level::Info)));
        assert!(logger.enabled(&metadata("web::router", Level::Error)));
        assert!(!logger.enabled(&metadata("web::router", Level::Debug)));
    }

    #[test]
    fn test_json_logger_filters_dependencies_only_when_asked() {
        let filtering = JsonLogger::new(LevelFilter::Trace, true);
        let unfiltered = JsonLogger::new(LevelFilter::Trace, false);

        assert!(!filtering.enabled(&metadata("hyper::proto::h1", Level::Info)));
        assert!(!filtering.enabled(&metadata("tokio::runtime", Level::Info)));
        assert!(unfiltered.enabled(&metadata("hyper::proto::h1", Level::Info)));
    }

    #[test]
    fn test_format_record_keeps_type_field_of_unhandled_errors() {
        let line = JsonLogger::format_record(
            &Record::builder()
                .args(format_args!("unhandled_exception"))
                .level(Level::Error)
                .target("web::error")
                .key_values(&[("type", "panic(&str)")])
                .build(),
        );
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["msg"], "unhandled_exception");
        assert_eq!(value["type"], "panic(&str)");
    }

    #[test]
    fn test_format_record_has_base_fields_and_structured_extras() {
        let line = JsonLogger::format_record(
            &Record::builder()
                .args(format_args!("request"))
                .level(Level::Info)
                .target("web::middleware::request_logging")
                .key_values(&[("status_code", 200)])
                .build(),
        );
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["level"], "info");
        assert_eq!(value["name"], "web::middleware::request_logging");
        assert_eq!(value["msg"], "request");
        assert_eq!(value["status_code"], 200);
        assert!(chrono::DateTime::parse_from_rfc3339(value["ts"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_format_record_extras_do_not_replace_base_fields() {
        let line = JsonLogger::format_record(
            &Record::builder()
                .args(format_args!("request"))
                .level(Level::Warn)
                .target("web")
                .key_values(&[("msg", "overridden"), ("path", "/health")])
                .build(),
        );
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["msg"], "request");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["path"], "/health");
    }
}
