use super::{find_page, open_store};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{LayoutMutation, PageBuilder, PageStatus};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Page id or slug
    pub page: String,

    /// JSON file holding an array of layout mutations, applied in order
    #[arg(short, long)]
    pub ops: Option<PathBuf>,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New slug
    #[arg(long)]
    pub slug: Option<String>,

    /// New status (draft, published, archived)
    #[arg(long)]
    pub status: Option<PageStatus>,

    /// Apply and report without saving
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let mutations: Vec<LayoutMutation> = match &args.ops {
        Some(path) => {
            let path = PathBuf::from(cwd).join(path);
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            serde_json::from_str(&source).with_context(|| format!("Invalid mutations in {}", path.display()))?
        }
        None => Vec::new(),
    };

    let record = find_page(&store, &args.page).await?;
    let mut builder = PageBuilder::new(store, config.editor_config());
    builder.load(&record.id).await?;
    builder.refresh_library().await;

    for (index, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        let outcome = builder
            .apply(mutation)
            .with_context(|| format!("Mutation #{} ({}) failed", index + 1, name))?;
        match outcome.created_id {
            Some(id) => println!("  {} {} → {}", "✓".green(), name, id.cyan()),
            None => println!("  {} {}", "✓".green(), name),
        }
    }

    if let Some(title) = args.title {
        builder.set_title(title);
    }
    if let Some(slug) = args.slug {
        builder.set_slug(slug);
    }
    if let Some(status) = args.status {
        builder.set_status(status);
    }

    if args.dry_run {
        println!("{}", "Dry run, nothing saved".dimmed());
        return Ok(());
    }

    let id = builder.save().await?;
    if let Some(notice) = builder.phase().notice() {
        println!("  {} {} ({})", "✓".green(), notice, id.cyan());
    }

    Ok(())
}
