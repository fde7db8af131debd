//! calendar-gateway server entry point.
//!
//! Loads configuration, initializes logging and serves until SIGINT/SIGTERM.

use tracing_subscriber::EnvFilter;

use calendar_gateway::app;
use calendar_gateway::config::{CalendarConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CalendarConfig::from_env()?;
    init_tracing(config.log_format);
    app::run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
