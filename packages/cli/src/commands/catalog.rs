use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::ModuleCatalog;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Only templates in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Print the templates as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn catalog(args: CatalogArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let mut catalog = ModuleCatalog::new();
    let errors = catalog.refresh(&store).await;
    for error in &errors {
        eprintln!("{} {}", "⚠️".yellow(), error);
    }

    let groups = catalog.by_category();
    let groups = groups
        .into_iter()
        .filter(|(category, _)| args.category.as_deref().map_or(true, |c| c == *category));

    if args.json {
        let templates: Vec<_> = groups.flat_map(|(_, templates)| templates).collect();
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    for (category, templates) in groups {
        println!("{}", category.bright_blue().bold());
        for template in templates {
            println!(
                "  {} {:<20} {}",
                template.icon.as_deref().unwrap_or("·"),
                template.key.cyan(),
                template.label
            );
        }
        println!();
    }

    println!("{} templates", catalog.len());
    Ok(())
}
