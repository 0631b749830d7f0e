use clap::Parser;
use std::path::PathBuf;
use tracing::{error, warn};

use promql_dashboard::{api, config::Config, logging};

#[derive(Parser, Debug)]
#[command(author, version, about = "Web front-end for PromQL instant queries", long_about = None)]
struct Args {
    /// Path to the TOML config file listing data sources
    #[arg(short, long, env = "PROMQL_DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long, env = "PROMQL_DASHBOARD_LISTEN")]
    listen: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "PROMQL_DASHBOARD_JSON_LOGS")]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init_logger(args.json_logs) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("No config file given, using built-in localhost data sources");
            Config::default()
        }
    };
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    if let Err(e) = api::start_server(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
