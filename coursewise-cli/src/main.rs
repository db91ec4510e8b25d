use anyhow::Result;
use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;
mod config;

#[derive(Parser)]
#[command(name = "coursewise", about = "Personalized course recommendations")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the course catalog
    Catalog(commands::catalog::CatalogArgs),
    /// Chat with the recommender in the terminal
    Chat(commands::chat::ChatArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Rate a course
    Feedback(commands::feedback::FeedbackArgs),
    /// List models installed on the Ollama server
    Models(commands::models::ModelsArgs),
    /// Get recommendations for a user
    Recommend(commands::recommend::RecommendArgs),
    /// Run the coursewise HTTP server
    Serve(commands::serve::ServeArgs),
    /// Manage users and their preferences
    User(commands::user::UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Chat(args) => commands::chat::run(args).await,
        Commands::Config(args) => commands::config::run(args),
        Commands::Feedback(args) => commands::feedback::run(args).await,
        Commands::Models(args) => commands::models::run(args).await,
        Commands::Recommend(args) => commands::recommend::run(args).await,
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::User(args) => commands::user::run(args).await,
    }
}
