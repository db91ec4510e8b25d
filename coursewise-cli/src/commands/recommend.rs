//! Recommendations from the terminal

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use coursewise_core::RecommendationSet;

use crate::bootstrap::App;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// User to recommend for
    pub user_id: String,

    /// What the user wants to learn (omit to use their preferences)
    pub query: Vec<String>,

    /// Number of recommendations
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print the raw JSON result
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RecommendArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let app = App::build(&config).await?;

    let limit = args.limit.unwrap_or_else(|| app.engine.default_limit());
    let query = args.query.join(" ");
    let set = app
        .engine
        .get_recommendations(&args.user_id, &query, limit)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        print_recommendations(&set);
    }
    Ok(())
}

fn print_recommendations(set: &RecommendationSet) {
    if set.is_empty() {
        println!("No recommendations found.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Course").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Level").fg(Color::Cyan),
        Cell::new("Score").fg(Color::Cyan),
    ]);

    for (rank, rec) in set.recommendations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&rec.course.id),
            Cell::new(&rec.course.title),
            Cell::new(&rec.course.category),
            Cell::new(rec.course.difficulty),
            Cell::new(format!("{:.3}", rec.final_score)),
        ]);
    }

    println!("{table}");
    println!();
    for (rank, rec) in set.recommendations.iter().enumerate() {
        println!("{}. {}", rank + 1, rec.explanation);
    }
    println!();
    println!(
        "Showing {} of {} matching courses",
        set.recommendations.len(),
        set.total_found
    );
}
