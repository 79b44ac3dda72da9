use bugcrowd_api::ApiConfig;
use bugcrowd_api::config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bugcrowd-mcp", version, about)]
pub struct Cli {
    /// Base address of the Bugcrowd REST API
    #[arg(long, env = "BUGCROWD_API_BASE", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Value sent in the `Bugcrowd-Version` header
    #[arg(long, env = "BUGCROWD_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Log filter directive (e.g. `info`, `bugcrowd_api=debug`)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Credentials stay on the default environment source and are read per call.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::default()
            .with_base_url(self.base_url.clone())
            .with_api_version(self.api_version.clone())
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries the protocol.
pub fn init_logging(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{level}': {e}"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}
