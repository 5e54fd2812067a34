#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

use command::{ChatInput, ChatStrategy, CommandStrategy, InitStrategy, VersionStrategy};

#[derive(Parser)]
#[command(name = "kaiwa")]
#[command(about = "Persona role-play chat over an LLM completion endpoint", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to a persona (single message or interactive loop)
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Persona id (clerk, teacher, guide, cat, ...)
        #[arg(short = 'p', long, default_value = "cat")]
        persona: String,

        /// Voice delivery speed
        #[arg(short = 's', long, default_value_t = 1.0)]
        speed: f32,

        /// Reply language (chinese or english)
        #[arg(short = 'l', long, default_value = "chinese")]
        language: String,

        /// Speaker gender (female or male)
        #[arg(short = 'g', long, default_value = "female")]
        gender: String,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            persona,
            speed,
            language,
            gender,
            model,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    persona,
                    speed,
                    language,
                    gender,
                    model,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
