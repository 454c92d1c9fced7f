use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fan_intake::config::AppConfig;
use fan_intake::infra::SqliteFanStore;
use fan_intake::logging;
use fan_intake::observability::metrics;
use fan_intake::server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "fan_intake")]
#[command(about = "Know Your Esports Fan: profiling form, insights and fan database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the form, insights and database views
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the submissions table and exit
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = AppConfig::load().context("failed to load configuration")?;
            if let Some(port) = port {
                config.port = port;
            }

            let handle = match metrics::install() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("Metrics recorder not installed: {}", e);
                    None
                }
            };

            let state = AppState::from_config(&config, handle).context("failed to build application state")?;
            if state.platform.is_none() {
                warn!("Twitch credentials not set, account linking is disabled");
            }
            info!(
                database = %config.database_path.display(),
                model = %config.model.model,
                "Starting fan intake server"
            );
            start_server(state, config.port).await?;
        }
        Commands::InitDb => {
            let path = AppConfig::database_path()?;
            SqliteFanStore::new(&path).init_schema()?;
            info!(path = %path.display(), "Database initialized");
        }
    }

    Ok(())
}
