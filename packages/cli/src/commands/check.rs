use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::store::PAGE_FILE_PREFIX;
use pagesmith_editor::{PageRecord, PageStore};
use pagesmith_layout::{parse, serialize, Layout};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Show every page, including the ones without issues
    #[arg(short, long)]
    pub verbose: bool,

    /// Rewrite outdated layouts in the current document shape
    #[arg(long)]
    pub fix: bool,
}

#[derive(Debug, PartialEq)]
enum Finding {
    Ok,
    /// Readable, but not in the canonical `{ sections, meta }` form
    Outdated(&'static str),
    Broken(String),
}

pub async fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    println!("🔍 {} Pagesmith store check", "Starting".green().bold());
    println!("   Store: {}", store.root().display());
    println!();

    let files = find_page_files(store.root());
    let mut broken = 0;
    let mut outdated = 0;
    let mut fixed = 0;

    for file in &files {
        let (record, finding) = inspect_file(file);
        match &finding {
            Finding::Ok => {
                if args.verbose {
                    println!("{} {}", "✓".green(), file.display());
                }
            }
            Finding::Outdated(reason) => {
                outdated += 1;
                println!("{} {} {}", "warning".yellow().bold(), file.display(), reason);
            }
            Finding::Broken(message) => {
                broken += 1;
                println!("{} {} {}", "error".red().bold(), file.display(), message);
            }
        }

        if let (true, Finding::Outdated(_), Some(record)) = (args.fix, &finding, record) {
            let mut payload = record.payload.clone();
            payload.layout_json = canonical_layout(&payload.layout_json)?;
            store.update_page(&record.id, &payload).await?;
            fixed += 1;
            println!("    {} Rewrote {}", "✓".green(), record.id);
        }
    }

    println!();
    println!(
        "✨ {} Check complete!",
        if broken > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Pages checked: {}", files.len());
    if broken > 0 {
        println!("   {} {}", "Broken:".red(), broken);
    }
    if outdated > 0 {
        println!("   {} {}", "Outdated:".yellow(), outdated);
    }
    if fixed > 0 {
        println!("   {} {}", "Fixed:".green(), fixed);
    }
    if broken == 0 && outdated == 0 {
        println!("   {} No issues found!", "✓".green());
    }

    if broken > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn inspect_file(path: &Path) -> (Option<PageRecord>, Finding) {
    let record: PageRecord = match fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|source| serde_json::from_str(&source).map_err(|e| e.to_string()))
    {
        Ok(record) => record,
        Err(message) => return (None, Finding::Broken(format!("unreadable record: {}", message))),
    };

    let finding = inspect_layout(&record.payload.layout_json);
    (Some(record), finding)
}

fn inspect_layout(layout_json: &str) -> Finding {
    let value: Value = match serde_json::from_str(layout_json) {
        Ok(value) => value,
        Err(e) => return Finding::Broken(format!("layout is not JSON: {}", e)),
    };
    let is_bare_array = value.is_array();

    let sections = match parse(layout_json) {
        Ok(sections) => sections,
        Err(e) => return Finding::Broken(e.to_string()),
    };

    if is_bare_array {
        return Finding::Outdated("layout is a bare section array");
    }

    match serialize(&Layout::new(sections)) {
        Ok(canonical) if canonical == layout_json => Finding::Ok,
        Ok(_) => Finding::Outdated("layout uses legacy styling or is not normalized"),
        Err(e) => Finding::Broken(e.to_string()),
    }
}

fn canonical_layout(layout_json: &str) -> Result<String> {
    Ok(serialize(&Layout::new(parse(layout_json)?))?)
}

fn find_page_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path
                    .file_name()
                    .map(|name| name.to_string_lossy().starts_with(PAGE_FILE_PREFIX))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
