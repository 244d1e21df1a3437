use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod util;

use commands::compare::CompareArgs;
use commands::ticket::TicketArgs;

#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Support ticket triage: classify intent, draft a reply, decide auto-send"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "TRIAGE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Classify, draft and gate a ticket locally (no server needed)
    Analyze(TicketArgs),
    /// Classify a ticket locally
    Classify(TicketArgs),
    /// Send a ticket to the triage API and print the full response
    Draft(TicketArgs),
    /// Measure how much an agent edited a generated draft
    Compare(CompareArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout stays pipeable JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Analyze(args) => commands::ticket::analyze_offline(args),
        Commands::Classify(args) => commands::ticket::classify_offline(args),
        Commands::Draft(args) => commands::ticket::draft_remote(&cli.api_url, args).await,
        Commands::Compare(args) => commands::compare::run(args),
    };

    std::process::exit(code);
}
