use super::{find_page, open_store};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{slugify, Page, PageStatus, PageStore};
use pagesmith_layout::IDGenerator;
use pagesmith_renderer::{render_page, ViewRegistry};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page id or slug (renders every published page when omitted)
    pub page: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    pub out_dir: String,

    /// Minified output (overrides config)
    #[arg(long)]
    pub compact: bool,
}

pub async fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);
    let content = config.load_content(cwd).await?;
    let views = ViewRegistry::with_builtins();

    let mut options = config.render_options();
    if args.compact {
        options.pretty = false;
    }

    let records = match &args.page {
        Some(key) => vec![find_page(&store, key).await?],
        None => store
            .list_pages()
            .await?
            .into_iter()
            .filter(|r| r.payload.status == PageStatus::Published)
            .collect(),
    };

    if records.is_empty() {
        println!("{}", "⚠️  No published pages to render".yellow());
        return Ok(());
    }

    let out_dir = PathBuf::from(cwd).join(&args.out_dir);
    for record in records {
        let page = Page::from_record(record, &mut IDGenerator::new(config.id_baseline));
        let html = render_page(&page, &content, &views, options.clone())?;

        if args.stdout {
            println!("{}", html);
            continue;
        }

        fs::create_dir_all(&out_dir)?;
        let output_file = out_dir.join(format!("{}.html", output_stem(&page.slug)?));
        fs::write(&output_file, html)?;
        println!("  {} {} → {}", "✓".green(), page.slug, output_file.display());
    }

    Ok(())
}

/// File name stem for a slug; anything that could leave the output directory is re-slugified
fn output_stem(slug: &str) -> Result<String> {
    let safe = !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if safe && !slug.is_empty() {
        return Ok(slug.to_string());
    }

    let stem = slugify(slug);
    if stem.is_empty() {
        return Err(anyhow!("Slug '{}' cannot be used as a file name", slug));
    }
    tracing::warn!("Slug '{}' is not a safe file name, writing {}.html", slug, stem);
    Ok(stem)
}
