mod commands;
mod keyfile;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::endpoints::run_endpoints_command;
use crate::commands::keygen::run_keygen_command;
use crate::commands::serve::run_serve_command;

#[derive(Parser)]
#[command(name = "tcval_cli")]
#[command(author, version, about = "Tcoin validation service tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the validation API service
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database path (overrides configuration)
        #[arg(long)]
        db_path: Option<String>,

        /// Keep all state in memory instead of SQLite
        #[arg(long)]
        in_memory: bool,
    },

    /// Generate a random API key
    Keygen {
        /// Key size in bytes
        #[arg(long, default_value_t = 32)]
        size: usize,

        /// Name the key is stored under when writing to a key file
        #[arg(long, default_value = "apiKey")]
        name: String,

        /// JSON key file to merge the generated key into
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Derive oracle endpoint ids and write them to a JSON file
    Endpoints {
        /// API title the endpoints belong to
        #[arg(long, default_value = "tCoinValidation")]
        title: String,

        /// Endpoint names to derive ids for
        #[arg(
            long = "endpoint",
            default_values_t = [
                "userStatus".to_string(),
                "userRoot".to_string(),
                "identityRoot".to_string(),
                "root".to_string(),
            ]
        )]
        endpoints: Vec<String>,

        /// Output file path
        #[arg(long, default_value = "apiEndpoints.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        CliCommand::Serve {
            port,
            db_path,
            in_memory,
        } => run_serve_command(port, db_path, in_memory).await,
        CliCommand::Keygen { size, name, path } => run_keygen_command(size, name, path),
        CliCommand::Endpoints {
            title,
            endpoints,
            path,
        } => run_endpoints_command(&title, &endpoints, &path),
    }
}
