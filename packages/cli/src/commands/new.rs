use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{PageBuilder, PageStatus, Seo};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Page title
    pub title: String,

    /// URL slug (derived from the title when omitted)
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Page status (draft, published, archived)
    #[arg(long, default_value = "draft")]
    pub status: PageStatus,

    /// Show the page in site navigation
    #[arg(long)]
    pub nav: bool,

    /// SEO meta description
    #[arg(long, default_value = "")]
    pub description: String,
}

pub async fn new(args: NewArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);
    store.ensure_dir().await?;

    let mut builder = PageBuilder::new(store, config.editor_config());
    builder.new_page();
    builder.set_title(args.title.as_str());
    if let Some(slug) = args.slug {
        builder.set_slug(slug);
    }
    builder.set_status(args.status);
    builder.set_show_in_nav(args.nav);
    builder.set_seo(Seo {
        description: args.description,
        keywords: String::new(),
    });

    let id = builder.save().await?;

    println!(
        "  {} Created {} ({}) → {}",
        "✓".green(),
        builder.page().title.bright_white(),
        builder.page().slug,
        id.cyan()
    );

    Ok(())
}
