mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    catalog, check, edit, init, list, new, render, show, CatalogArgs, CheckArgs, EditArgs, InitArgs, ListArgs,
    NewArgs, RenderArgs, ShowArgs,
};
use tracing_subscriber::EnvFilter;

/// Pagesmith CLI - Build pages from sections, rows, columns and modules
#[derive(Parser, Debug)]
#[command(name = "pagesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagesmith site
    Init(InitArgs),

    /// Create a page holding the starter layout
    New(NewArgs),

    /// List stored pages
    List(ListArgs),

    /// Print a page and its layout outline
    Show(ShowArgs),

    /// Apply layout mutations and metadata changes to a page
    Edit(EditArgs),

    /// Render pages to HTML
    Render(RenderArgs),

    /// List the module catalog
    Catalog(CatalogArgs),

    /// Check stored layouts for broken or outdated documents
    Check(CheckArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::New(args) => new(args, &cwd).await,
        Command::List(args) => list(args, &cwd).await,
        Command::Show(args) => show(args, &cwd).await,
        Command::Edit(args) => edit(args, &cwd).await,
        Command::Render(args) => render(args, &cwd).await,
        Command::Catalog(args) => catalog(args, &cwd).await,
        Command::Check(args) => check(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
