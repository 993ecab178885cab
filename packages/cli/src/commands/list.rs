use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{PageStatus, PageStore};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only pages with this status
    #[arg(long)]
    pub status: Option<PageStatus>,
}

pub async fn list(args: ListArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let pages: Vec<_> = store
        .list_pages()
        .await?
        .into_iter()
        .filter(|p| args.status.map_or(true, |status| p.payload.status == status))
        .collect();

    if pages.is_empty() {
        println!("{}", "⚠️  No pages found".yellow());
        return Ok(());
    }

    for page in &pages {
        let status = match page.payload.status {
            PageStatus::Published => page.payload.status.as_str().green(),
            PageStatus::Draft => page.payload.status.as_str().yellow(),
            PageStatus::Archived => page.payload.status.as_str().dimmed(),
        };
        let nav = if page.payload.show_in_nav { "nav" } else { "" };
        println!(
            "  {}  {:<24} {:<10} {:<4} {}",
            page.id.cyan(),
            page.payload.slug,
            status,
            nav,
            page.payload.title
        );
    }

    println!();
    println!("{} pages", pages.len());
    Ok(())
}
