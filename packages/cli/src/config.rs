use pagesmith_editor::EditorConfig;
use pagesmith_layout::DEFAULT_ID_BASELINE;
use pagesmith_renderer::{ContentCollections, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagesmith.config.json";

/// Pagesmith configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one JSON file per page
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// First counter value for generated node ids
    #[serde(default = "default_id_baseline")]
    pub id_baseline: u64,

    #[serde(default = "default_success_notice_ms")]
    pub success_notice_ms: u64,

    #[serde(default = "default_error_notice_ms")]
    pub error_notice_ms: u64,

    /// HTML output options
    #[serde(default)]
    pub render: RenderConfig,

    /// Optional JSON file with events, tickets, speakers, forms and blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

fn default_store_dir() -> String {
    "pages".to_string()
}

fn default_id_baseline() -> u64 {
    DEFAULT_ID_BASELINE
}

fn default_success_notice_ms() -> u64 {
    3000
}

fn default_error_notice_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub pretty: bool,
    pub indent: String,
    pub inline_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            pretty: options.pretty,
            indent: options.indent,
            inline_styles: options.inline_styles,
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the page store directory
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            id_baseline: self.id_baseline,
            success_notice: Duration::from_millis(self.success_notice_ms),
            error_notice: Duration::from_millis(self.error_notice_ms),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            inline_styles: self.render.inline_styles,
            pretty: self.render.pretty,
            indent: self.render.indent.clone(),
        }
    }

    /// Content collections named by `content`, or empty ones
    pub async fn load_content(&self, cwd: &str) -> anyhow::Result<ContentCollections> {
        match &self.content {
            Some(path) => {
                let source = tokio::fs::read_to_string(PathBuf::from(cwd).join(path)).await?;
                Ok(ContentCollections::from_json(&source)?)
            }
            None => Ok(ContentCollections::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            id_baseline: default_id_baseline(),
            success_notice_ms: default_success_notice_ms(),
            error_notice_ms: default_error_notice_ms(),
            render: RenderConfig::default(),
            content: None,
        }
    }
}
