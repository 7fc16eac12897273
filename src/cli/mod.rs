pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agileboard")]
#[command(about = "AgileBoard CLI - run and maintain the AgileBoard API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, short, help = "Port to listen on (defaults to the configured port)")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Hash a password and print the base64 hash and salt")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::HashPassword { password } => commands::hash_password::handle(&password),
    }
}
