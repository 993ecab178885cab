use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::store::{BLOCKS_FILE, FORMS_FILE};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Page store directory
    #[arg(short, long, default_value = "pages")]
    pub store_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagesmith site...".bright_blue().bold());

    let store_dir = PathBuf::from(cwd).join(&args.store_dir);
    if !store_dir.exists() {
        fs::create_dir_all(&store_dir)?;
        println!("  {} Created {}/", "✓".green(), args.store_dir);
    }

    // Empty module libraries, ready to be filled in
    for file in [BLOCKS_FILE, FORMS_FILE] {
        let path = store_dir.join(file);
        if !path.exists() {
            fs::write(&path, "[]\n")?;
            println!("  {} Created {}/{}", "✓".green(), args.store_dir, file);
        }
    }

    let config = Config {
        store_dir: args.store_dir.clone(),
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Site initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagesmith new \"Home\"");
    println!("  2. Run: pagesmith render home");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(
            InitArgs {
                store_dir: "site".to_string(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.store_dir, "site");
        assert!(dir.path().join("site").join(BLOCKS_FILE).exists());
    }
}
