//! User registration and preference commands

use anyhow::Result;
use clap::{Args, Subcommand};
use coursewise_core::PreferenceProfile;

use crate::bootstrap::App;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Register a user, extracting preferences from a description
    Create {
        user_id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Free-text description of interests and goals
        description: Vec<String>,
    },
    /// Show a user's preference profile
    Show { user_id: String },
    /// Re-derive preferences from a new description
    Update {
        user_id: String,
        description: Vec<String>,
    },
    /// List the user's past learning goals, newest first
    History { user_id: String },
}

pub async fn run(args: UserArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let app = App::open(&config).await?;
    let engine = &app.engine;

    match args.command {
        UserCommands::Create {
            user_id,
            name,
            description,
        } => {
            let user = engine
                .create_user(&user_id, &name, &description.join(" "))
                .await?;
            println!("Registered {} ({})", user.name, user.user_id);
            print_profile(&user.preferences);
        }
        UserCommands::Show { user_id } => {
            let user = engine.user(&user_id).await?;
            println!("{} ({})", user.name, user.user_id);
            println!("Member since {}", user.created_at.format("%Y-%m-%d"));
            print_profile(&user.preferences);
        }
        UserCommands::Update {
            user_id,
            description,
        } => {
            let profile = engine
                .update_preferences(&user_id, &description.join(" "))
                .await?;
            print_profile(&profile);
        }
        UserCommands::History { user_id } => {
            engine.user(&user_id).await?;
            let queries = engine.query_history(&user_id).await?;
            if queries.is_empty() {
                println!("No learning goals yet.");
            }
            for (i, query) in queries.iter().enumerate() {
                println!("{}. {}", i + 1, query);
            }
        }
    }
    Ok(())
}

fn print_profile(profile: &PreferenceProfile) {
    println!();
    println!("Preferences:");
    println!("  Categories: {}", profile.categories_text());
    if let Some(difficulty) = &profile.preferred_difficulty {
        println!("  Difficulty: {}", difficulty);
    }
    if let Some(style) = &profile.learning_style {
        println!("  Learning style: {}", style);
    }
    println!("  Duration: {}", profile.preferred_duration);
    println!("  Budget: {}", profile.budget_preference);
    println!("  Goals: {}", profile.goals_text());
    if let Some(custom) = &profile.custom {
        println!("  Notes: {}", custom);
    }
}
