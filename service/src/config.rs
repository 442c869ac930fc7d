use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use log::LevelFilter;
use std::convert::Infallible;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Runtime environment name. Anything other than the known names is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Staging,
    Production,
    Test,
    Other(String),
}

impl FromStr for RuntimeEnv {
    type Err = Infallible;
    fn from_str(env: &str) -> Result<RuntimeEnv, Self::Err> {
        Ok(match env.to_lowercase().as_str() {
            "development" => RuntimeEnv::Development,
            "staging" => RuntimeEnv::Staging,
            "production" => RuntimeEnv::Production,
            "test" => RuntimeEnv::Test,
            _ => RuntimeEnv::Other(env.to_string()),
        })
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeEnv::Development => write!(f, "development"),
            RuntimeEnv::Staging => write!(f, "staging"),
            RuntimeEnv::Production => write!(f, "production"),
            RuntimeEnv::Test => write!(f, "test"),
            RuntimeEnv::Other(env) => write!(f, "{env}"),
        }
    }
}

/// Output format for log lines on stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable colored terminal output
    Text,
}

// Unknown level names fall back to info rather than refusing to start.
fn parse_log_level(level: &str) -> Result<LevelFilter, Infallible> {
    Ok(level.parse().unwrap_or(LevelFilter::Info))
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs allowed to receive server responses outside production.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Runtime environment name, reported by the health endpoint.
    #[arg(short, long, env = "ENV", default_value = "development")]
    pub env: RuntimeEnv,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(short, long, env, default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,

    /// Format of log lines written to standard output.
    #[arg(long, env, value_enum, ignore_case = true, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8000)]
    pub port: u16,

    /// Maximum number of undelivered diagnostic events kept in memory. Oldest
    /// events are dropped when full. Unbounded when not set.
    #[arg(long, env)]
    pub event_queue_capacity: Option<usize>,

    /// Longest time in milliseconds an idle diagnostics stream waits before polling the queue again.
    #[arg(long, env, default_value_t = 500)]
    pub stream_poll_interval_ms: u64,

    /// Interval in seconds between SSE keep-alive comments. None are sent when not set.
    #[arg(long, env)]
    pub sse_keep_alive_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse from an explicit argument list (the first item is the binary name).
    /// Environment variables still apply to flags not given.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Config::try_parse_from(args)
    }

    pub fn with_runtime_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn runtime_env(&self) -> RuntimeEnv {
        self.env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.env == RuntimeEnv::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.interface, self.port)
    }

    pub fn stream_poll_interval(&self) -> Duration {
        Duration::from_millis(self.stream_poll_interval_ms)
    }

    pub fn sse_keep_alive(&self) -> Option<Duration> {
        self.sse_keep_alive_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_env_parses_known_names_case_insensitively() {
        assert_eq!("production".parse(), Ok(RuntimeEnv::Production));
        assert_eq!("PRODUCTION".parse(), Ok(RuntimeEnv::Production));
        assert_eq!("Development".parse(), Ok(RuntimeEnv::Development));
        assert_eq!("staging".parse(), Ok(RuntimeEnv::Staging));
        assert_eq!("test".parse(), Ok(RuntimeEnv::Test));
    }

    #[test]
    fn runtime_env_keeps_unknown_names_verbatim() {
        let env: RuntimeEnv = "qa-east".parse().unwrap();
        assert_eq!(env, RuntimeEnv::Other("qa-east".to_string()));
        assert_eq!(env.to_string(), "qa-east");
    }

    #[test]
    fn log_level_parsing_is_case_insensitive_with_info_fallback() {
        assert_eq!(parse_log_level("debug"), Ok(LevelFilter::Debug));
        assert_eq!(parse_log_level("WARN"), Ok(LevelFilter::Warn));
        assert_eq!(parse_log_level("verbose"), Ok(LevelFilter::Info));
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = Config::try_from_args([
            "agent_diagnostics",
            "--env",
            "test",
            "--log-level",
            "debug",
            "--log-format",
            "text",
            "--port",
            "8080",
            "--event-queue-capacity",
            "64",
            "--stream-poll-interval-ms",
            "250",
            "--allowed-origins",
            "http://localhost:3000,http://localhost:5173",
        ])
        .unwrap();

        assert_eq!(config.runtime_env(), RuntimeEnv::Test);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.port, 8080);
        assert_eq!(config.event_queue_capacity, Some(64));
        assert_eq!(config.stream_poll_interval(), Duration::from_millis(250));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        assert!(!config.is_production());
    }

    #[test]
    fn production_is_detected_and_overridable() {
        let config = Config::try_from_args(["agent_diagnostics", "--env", "production"]).unwrap();
        assert!(config.is_production());

        let config = config.with_runtime_env(RuntimeEnv::Development);
        assert!(!config.is_production());
    }

    #[test]
    fn default_port_matches_the_viewer_api_base() {
        let config = Config::try_from_args(["agent_diagnostics", "--interface", "0.0.0.0"]).unwrap();
        if std::env::var_os("PORT").is_none() {
            assert_eq!(config.bind_address(), "0.0.0.0:8000");
        }
    }

    #[test]
    fn keep_alive_interval_is_given_in_seconds() {
        let config =
            Config::try_from_args(["agent_diagnostics", "--sse-keep-alive-secs", "15"]).unwrap();
        assert_eq!(config.sse_keep_alive(), Some(Duration::from_secs(15)));
    }
}
