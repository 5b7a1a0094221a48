pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "genba")]
#[command(about = "Genba CLI - operator tool for the Genba back-office API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a session token signed with SESSION_SECRET")]
    Token(commands::token::TokenArgs),

    #[command(about = "Look up the address for a Japanese postal code")]
    Postal(commands::postal::PostalArgs),

    #[command(about = "Check a running server's /health endpoint")]
    Health(commands::health::HealthArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Postal(args) => commands::postal::handle(args, output_format).await,
        Commands::Health(args) => commands::health::handle(args, output_format).await,
    }
}
