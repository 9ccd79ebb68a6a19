use clap::{Parser, Subcommand};
use repair_queue_simulator_cli::{load_request, web};
use repair_queue_simulator_core_rs::SimulationService;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "repair-sim", version, about = "Repair shop discrete-event simulator")]
struct Cli {
    /// Log filter used when RUST_LOG is unset, e.g. "debug" or "repair_queue_simulator_core_rs=debug"
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one simulation and print the result as JSON
    Run {
        /// TOML file with the simulation parameters
        #[arg(long)]
        config: PathBuf,

        /// Seed overriding the one in the file
        #[arg(long)]
        seed: Option<u64>,

        /// Include the reported rows in the output
        #[arg(long, default_value_t = false)]
        rows: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Where the HTTP API will listen
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run { config, seed, rows } => {
            let mut request = load_request(&config)?;
            if seed.is_some() {
                request.seed = seed;
            }

            let mut response = SimulationService::new().simulate(&request)?;
            if !rows {
                response.reported_snapshots.clear();
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve { addr } => web::serve(addr).await?,
    }

    Ok(())
}
