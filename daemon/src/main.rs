//! Webcash daemon — entry point for running a webcash server.

use clap::Parser;
use std::path::PathBuf;

use webcash_node::{init_logging, LogFormat, NodeConfig, WebcashNode};

#[derive(Parser)]
#[command(name = "webcash-daemon", about = "Webcash server daemon")]
struct Cli {
    /// Address to bind the HTTP API on.
    #[arg(long, env = "WEBCASH_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Port for the HTTP API.
    #[arg(long, env = "WEBCASH_PORT")]
    port: Option<u16>,

    /// Data directory for the durable checkpoint.
    #[arg(long, env = "WEBCASH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "WEBCASH_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WEBCASH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// File config (or defaults) overlaid with whatever flags were given.
    fn into_config(self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)?,
            None => NodeConfig::default(),
        };
        if let Some(listen_addr) = self.listen_addr {
            config.listen_addr = listen_addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let config = cli.into_config()?;

    init_logging(
        LogFormat::from_config(&config.log_format),
        &config.log_level,
    );

    if let Some(path) = config_path {
        tracing::info!("loaded config from {}", path.display());
    }
    tracing::info!(
        addr = %config.listen_addr,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "starting webcash server"
    );

    let node = WebcashNode::new(config)?;
    node.run().await?;

    tracing::info!("webcash daemon exited cleanly");
    Ok(())
}
