//! Agentura CLI — the main entry point.
//!
//! Commands:
//! - `init`      — Write the starter config and data directory
//! - `gateway`   — Start the HTTP API server
//! - `chat`      — Interactive chat or single-message mode
//! - `sessions`  — List, show, and delete stored sessions
//! - `tools`     — List the registered tools

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agentura",
    about = "Agentura — two-stage tool-orchestrating chat gateway",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the starter configuration and data directory
    Init,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Inspect the tool registry
    Tools {
        #[command(subcommand)]
        action: ToolAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions, most recent first
    List,
    /// Print a session's transcript
    Show { id: String },
    /// Delete one session
    Delete { id: String },
    /// Delete every session
    Clear,
}

#[derive(Subcommand)]
enum ToolAction {
    /// List tools with their parameters
    List {
        /// Print the JSON schema of each tool
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Chat { message, session } => commands::chat::run(message, session).await?,
        Commands::Sessions { action } => match action {
            SessionAction::List => commands::sessions::list().await?,
            SessionAction::Show { id } => commands::sessions::show(&id).await?,
            SessionAction::Delete { id } => commands::sessions::delete(&id).await?,
            SessionAction::Clear => commands::sessions::clear().await?,
        },
        Commands::Tools { action } => match action {
            ToolAction::List { json } => commands::tools::list(json)?,
        },
    }

    Ok(())
}
