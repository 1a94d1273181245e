pub mod commands;

use clap::{ArgGroup, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "lms-api")]
#[command(about = "LMS API - courses, video memos and course reviews")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides configuration)")]
        port: Option<u16>,

        #[arg(long, help = "Apply database migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Mint an access token for an existing user")]
    #[command(group(ArgGroup::new("user").required(true).args(["user_id", "login"])))]
    Token {
        #[arg(long, help = "User id")]
        user_id: Option<uuid::Uuid>,

        #[arg(long, help = "User login (the memory backend seeds instructor, learner and admin)")]
        login: Option<String>,
    },
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
        Commands::Serve { port, migrate } => commands::serve::handle(port, migrate).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token { user_id, login } => {
            let user = match (user_id, login) {
                (Some(id), _) => commands::token::UserRef::Id(id),
                (None, Some(login)) => commands::token::UserRef::Login(login),
                (None, None) => anyhow::bail!("either --user-id or --login is required"),
            };
            commands::token::handle(user, output_format).await
        }
    }
}
