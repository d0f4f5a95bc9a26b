mod cmd;
mod output;
mod root;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, protocol::ProtocolSubcommand};
use std::path::{Path, PathBuf};
use vlab_core::config::ProviderConfig;

#[derive(Parser)]
#[command(
    name = "vlab",
    about = "Virtual Lab activity provider: serve the Inven!RA endpoints and check lab protocols",
    version,
    propagate_version = true
)]
struct Cli {
    /// Provider config file (default: nearest vlab.yaml, else built-in defaults)
    #[arg(long, global = true, env = "VLAB_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port; 0 = OS-assigned)
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Open the documentation page in a browser
        #[arg(long)]
        open: bool,
    },

    /// Compile, evaluate and export lab protocols
    Protocol {
        #[command(subcommand)]
        subcommand: ProtocolSubcommand,
    },

    /// Inspect and validate the provider configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Send one analytics submission to a running provider
    Submit {
        /// Full analytics endpoint, e.g. http://127.0.0.1:5000/analytics_url
        #[arg(long)]
        url: String,

        /// Activity id
        #[arg(long)]
        activity: String,

        /// Student id (at least 3 characters)
        #[arg(long)]
        student: String,

        /// json_params document
        #[arg(long)]
        params: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = root::resolve_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Serve { host, port, open } => {
            load_config(config_path.as_deref()).and_then(|c| cmd::serve::run(c, host, port, open))
        }
        Commands::Protocol { subcommand } => load_config(config_path.as_deref())
            .and_then(|c| cmd::protocol::run(&c, subcommand, cli.json)),
        Commands::Config { subcommand } => {
            cmd::config::run(config_path.as_deref(), subcommand, cli.json)
        }
        Commands::Submit {
            url,
            activity,
            student,
            params,
        } => cmd::submit::run(&url, &activity, &student, params.as_deref(), cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProviderConfig> {
    ProviderConfig::load_or_default(path).context("failed to load config")
}
