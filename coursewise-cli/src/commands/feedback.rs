use anyhow::Result;
use clap::Args;

use crate::bootstrap::App;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    /// User giving the rating
    pub user_id: String,

    /// Course being rated
    pub course_id: String,

    /// Rating from 1 to 5
    #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: u8,

    /// Optional comment
    pub comment: Vec<String>,
}

pub async fn run(args: FeedbackArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let app = App::open(&config).await?;

    let comment = Some(args.comment.join(" ")).filter(|c| !c.trim().is_empty());
    let receipt = app
        .engine
        .record_feedback(&args.user_id, &args.course_id, args.rating, comment)
        .await?;

    if receipt.preferences_updated {
        println!("Feedback recorded, preferences updated.");
    } else {
        println!("Feedback recorded.");
    }
    Ok(())
}
