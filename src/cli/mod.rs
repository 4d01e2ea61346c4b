pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "discover")]
#[command(about = "Discover CLI - inspect access rules and administer business claims")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "DISCOVER_SERVER",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of a running Discover API"
    )]
    pub server: String,

    #[arg(
        long,
        global = true,
        env = "DISCOVER_TOKEN",
        hide_env_values = true,
        help = "Session token sent as a bearer token"
    )]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print the route classification table")]
    Routes,

    #[command(about = "Show what the access classifier decides for a path")]
    Classify(commands::classify::ClassifyArgs),

    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Review business ownership claims (administrators)")]
    Claims {
        #[command(subcommand)]
        cmd: commands::claims::ClaimsCommands,
    },

    #[command(about = "Mint a development session token")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Routes => commands::routes::handle(output_format),
        Commands::Classify(args) => commands::classify::handle(args, output_format),
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Claims { cmd } => {
            let client = client::ApiClient::new(&cli.server, cli.token)?;
            commands::claims::handle(cmd, &client, output_format).await
        }
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}
