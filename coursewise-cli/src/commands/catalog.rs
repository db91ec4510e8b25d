//! Catalog inspection commands

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use coursewise_core::Catalog;

use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Summarize the catalog by category and difficulty
    Info,
    /// Show one course
    Show { course_id: String },
}

pub fn run(args: CatalogArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let catalog = Catalog::from_csv_path(&config.catalog.path)?;

    match args.command {
        CatalogCommands::Info => show_info(&catalog),
        CatalogCommands::Show { course_id } => show_course(&catalog, &course_id),
    }
}

fn show_info(catalog: &Catalog) -> Result<()> {
    let mut by_category: BTreeMap<&str, BTreeMap<String, usize>> = BTreeMap::new();
    for course in catalog.iter() {
        *by_category
            .entry(course.category.as_str())
            .or_default()
            .entry(course.difficulty.to_string())
            .or_default() += 1;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Courses").fg(Color::Cyan),
        Cell::new("By difficulty").fg(Color::Cyan),
    ]);

    for (category, levels) in &by_category {
        let total: usize = levels.values().sum();
        let breakdown = levels
            .iter()
            .map(|(level, count)| format!("{}: {}", level, count))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(category),
            Cell::new(total),
            Cell::new(breakdown),
        ]);
    }

    println!("{table}");
    println!("{} courses", catalog.len());
    Ok(())
}

fn show_course(catalog: &Catalog, course_id: &str) -> Result<()> {
    let Some(course) = catalog.get(course_id) else {
        bail!("Course '{}' not found", course_id);
    };

    println!("{}", course.title);
    println!("ID: {}", course.id);
    println!("Offered by: {}", course.description);
    println!("Category: {}", course.category);
    println!("Difficulty: {}", course.difficulty);
    println!("Duration: {} hours", course.duration);
    println!("Rating: {:.1}", course.rating);
    println!("Price: ${:.2}", course.price);
    println!(
        "Tags: {}",
        course.tags.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}
