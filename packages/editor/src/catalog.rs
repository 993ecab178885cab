//! # Module Catalog
//!
//! Read-only registry of module templates offered to the operator. A template
//! is copied, with a fresh id, every time a module is inserted.
//!
//! Built-in types are always present. Reusable content blocks and forms are
//! fetched from a [`CatalogSource`]; only `published` entries become templates.

use crate::store::StoreError;
use pagesmith_layout::Module;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub const PUBLISHED: &str = "published";

/// Reusable descriptor a module is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemplate {
    /// Unique key in the catalog (`heading`, `block-12`, `form-3`)
    pub key: String,
    /// Module type name written into the layout
    pub name: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub default_props: Map<String, Value>,
    #[serde(default)]
    pub block_id: Option<String>,
}

impl ModuleTemplate {
    pub fn builtin(name: &str, label: &str, category: &str, icon: &str, default_props: Value) -> Self {
        Self {
            key: name.to_string(),
            name: name.to_string(),
            label: label.to_string(),
            category: category.to_string(),
            icon: Some(icon.to_string()),
            default_props: into_map(default_props),
            block_id: None,
        }
    }

    /// Copy this template into a module with the given id
    pub fn instantiate(&self, id: String) -> Module {
        Module {
            id,
            name: self.name.clone(),
            category: self.category.clone(),
            default_props: self.default_props.clone(),
            block_id: self.block_id.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Reusable content block as served by the content service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    pub status: String,
}

/// Form definition as served by the form service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDescriptor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub form_config: Value,
    pub status: String,
}

/// Remote source of blocks and forms
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch_blocks(&self) -> Result<Vec<BlockDescriptor>, StoreError>;

    async fn fetch_forms(&self) -> Result<Vec<FormDescriptor>, StoreError>;
}

/// Result of one library fetch, applied to a catalog separately so a
/// caller that went away can simply drop it
#[derive(Debug, Default)]
pub struct LibraryFetch {
    pub blocks: Option<Vec<BlockDescriptor>>,
    pub forms: Option<Vec<FormDescriptor>>,
    pub errors: Vec<String>,
}

/// Fetch blocks and forms; failures are collected, not propagated
pub async fn fetch_library<C: CatalogSource>(source: &C) -> LibraryFetch {
    let mut fetch = LibraryFetch::default();

    match source.fetch_blocks().await {
        Ok(blocks) => fetch.blocks = Some(blocks),
        Err(e) => {
            tracing::warn!("Failed to fetch content blocks: {}", e);
            fetch.errors.push(format!("blocks: {}", e));
        }
    }

    match source.fetch_forms().await {
        Ok(forms) => fetch.forms = Some(forms),
        Err(e) => {
            tracing::warn!("Failed to fetch forms: {}", e);
            fetch.errors.push(format!("forms: {}", e));
        }
    }

    fetch
}

#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    builtin: Vec<ModuleTemplate>,
    blocks: Vec<ModuleTemplate>,
    forms: Vec<ModuleTemplate>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self {
            builtin: builtin_templates(),
            blocks: Vec::new(),
            forms: Vec::new(),
        }
    }

    /// Replace block templates with the published entries of `blocks`
    pub fn absorb_blocks(&mut self, blocks: Vec<BlockDescriptor>) -> usize {
        self.blocks = blocks
            .into_iter()
            .filter(|b| b.status == PUBLISHED)
            .map(|b| {
                let mut props = Map::new();
                props.insert("blockId".to_string(), Value::String(b.id.clone()));
                if let Some(content_type) = &b.content_type {
                    props.insert("contentType".to_string(), Value::String(content_type.clone()));
                }
                ModuleTemplate {
                    key: format!("block-{}", b.id),
                    name: "block".to_string(),
                    label: b.name,
                    category: "content".to_string(),
                    icon: Some("layers".to_string()),
                    default_props: props,
                    block_id: Some(b.id),
                }
            })
            .collect();
        self.blocks.len()
    }

    /// Replace form templates with the published entries of `forms`
    pub fn absorb_forms(&mut self, forms: Vec<FormDescriptor>) -> usize {
        self.forms = forms
            .into_iter()
            .filter(|f| f.status == PUBLISHED)
            .map(|f| ModuleTemplate {
                key: format!("form-{}", f.id),
                name: "form".to_string(),
                label: f.name,
                category: "forms".to_string(),
                icon: Some("clipboard".to_string()),
                default_props: into_map(json!({ "formId": f.id })),
                block_id: None,
            })
            .collect();
        self.forms.len()
    }

    /// Apply a fetch result; kinds that failed to fetch keep their previous templates
    pub fn absorb(&mut self, fetch: LibraryFetch) {
        if let Some(blocks) = fetch.blocks {
            let count = self.absorb_blocks(blocks);
            tracing::debug!("Catalog holds {} published blocks", count);
        }
        if let Some(forms) = fetch.forms {
            let count = self.absorb_forms(forms);
            tracing::debug!("Catalog holds {} published forms", count);
        }
    }

    pub async fn refresh<C: CatalogSource>(&mut self, source: &C) -> Vec<String> {
        let mut fetch = fetch_library(source).await;
        let errors = std::mem::take(&mut fetch.errors);
        self.absorb(fetch);
        errors
    }

    pub fn templates(&self) -> impl Iterator<Item = &ModuleTemplate> {
        self.builtin.iter().chain(self.blocks.iter()).chain(self.forms.iter())
    }

    pub fn get(&self, key: &str) -> Option<&ModuleTemplate> {
        self.templates().find(|t| t.key == key)
    }

    pub fn len(&self) -> usize {
        self.builtin.len() + self.blocks.len() + self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn by_category(&self) -> BTreeMap<&str, Vec<&ModuleTemplate>> {
        let mut groups: BTreeMap<&str, Vec<&ModuleTemplate>> = BTreeMap::new();
        for template in self.templates() {
            groups.entry(template.category.as_str()).or_default().push(template);
        }
        groups
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_templates() -> Vec<ModuleTemplate> {
    vec![
        ModuleTemplate::builtin("heading", "Heading", "basic", "heading", json!({ "text": "Heading", "level": 2 })),
        ModuleTemplate::builtin("text", "Text", "basic", "type", json!({ "text": "Write something..." })),
        ModuleTemplate::builtin(
            "button",
            "Button",
            "basic",
            "mouse-pointer",
            json!({ "label": "Learn more", "href": "#", "variant": "primary" }),
        ),
        ModuleTemplate::builtin("image", "Image", "media", "image", json!({ "src": "", "alt": "" })),
        ModuleTemplate::builtin("video", "Video", "media", "video", json!({ "url": "", "autoplay": false })),
        ModuleTemplate::builtin("divider", "Divider", "layout", "minus", json!({})),
        ModuleTemplate::builtin("spacer", "Spacer", "layout", "move-vertical", json!({ "height": 32 })),
        ModuleTemplate::builtin("events", "Events", "event", "calendar", json!({ "limit": 6 })),
        ModuleTemplate::builtin("speakers", "Speakers", "event", "users", json!({ "limit": 8, "columns": 4 })),
        ModuleTemplate::builtin("tickets", "Tickets", "event", "ticket", json!({ "showSoldOut": false })),
        ModuleTemplate::builtin("schedule", "Schedule", "event", "clock", json!({})),
        ModuleTemplate::builtin("cart", "Cart", "commerce", "shopping-cart", json!({})),
        ModuleTemplate::builtin("checkout", "Checkout", "commerce", "credit-card", json!({})),
    ]
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
