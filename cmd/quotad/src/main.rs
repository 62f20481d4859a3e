use clap::Parser;
use pkg_api::server::{ServerConfig, start_server};
use pkg_types::config::{QuotadConfigFile, load_config_file};
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quotad", about = "elastic quota topology control plane")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = "/etc/quotad/config.yaml")]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: QuotadConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(9443);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| "/tmp/quotad-data".to_string());

    info!("Starting quotad");
    info!("  Port:      {}", port);
    info!("  Data dir:  {}", data_dir);

    let config = ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        data_dir,
    };

    start_server(config).await?;

    Ok(())
}
