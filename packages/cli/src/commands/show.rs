use super::{find_page, open_store};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{PageRecord, StoreResponse};
use pagesmith_layout::{parse, preset_name, Section};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Page id or slug
    pub page: String,

    /// Print the stored record as a `{ success, data, error }` envelope
    #[arg(long)]
    pub json: bool,
}

pub async fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    if args.json {
        let response: StoreResponse<PageRecord> = find_page(&store, &args.page)
            .await
            .map_err(|e| pagesmith_editor::StoreError::Transport(e.to_string()))
            .into();
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let record = find_page(&store, &args.page).await?;
    let payload = &record.payload;

    println!("{}", payload.title.bright_white().bold());
    println!("   Id:      {}", record.id.cyan());
    println!("   Slug:    {}", payload.slug);
    println!("   Status:  {}", payload.status.as_str());
    println!("   Nav:     {}", if payload.show_in_nav { "yes" } else { "no" });
    println!("   Updated: {}", record.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if !payload.meta_description.is_empty() {
        println!("   SEO:     {}", payload.meta_description.dimmed());
    }
    println!();

    match parse(&payload.layout_json) {
        Ok(sections) => print_outline(&sections),
        Err(e) => println!("  {} Layout unreadable: {}", "✗".red(), e.to_string().red()),
    }

    Ok(())
}

fn print_outline(sections: &[Section]) {
    for section in sections {
        println!(
            "  {} {} {}",
            "▸".bright_blue(),
            section.name.bold(),
            format!("[{}] {}", section.kind, section.id).dimmed()
        );
        for row in &section.rows {
            println!(
                "    {} {} {}",
                "row".bright_black(),
                preset_name(&row.widths()),
                row.id.dimmed()
            );
            for column in &row.columns {
                let modules: Vec<&str> = column.modules.iter().map(|m| m.name.as_str()).collect();
                println!(
                    "      {}% {}",
                    column.width,
                    if modules.is_empty() {
                        "(empty)".dimmed().to_string()
                    } else {
                        modules.join(", ")
                    }
                );
            }
        }
    }
}
