//! Page metadata and the layout it owns

use crate::store::{PagePayload, PageRecord};
use pagesmith_layout::{parse_or_starter, IDGenerator, Layout, ParseResult, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            "archived" => Ok(PageStatus::Archived),
            other => Err(format!("unknown page status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    pub description: String,
    pub keywords: String,
}

/// A page being edited
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Assigned by the store on first save
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub status: PageStatus,
    pub show_in_nav: bool,
    pub seo: Seo,
    pub layout: Layout,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl Page {
    pub fn new(layout: Layout) -> Self {
        Self {
            id: None,
            title: String::new(),
            slug: String::new(),
            status: PageStatus::Draft,
            show_in_nav: false,
            seo: Seo::default(),
            layout,
        }
    }

    /// Required fields must be non-blank before the page can be saved
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.slug.trim().is_empty() {
            missing.push("slug");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Transport form of this page, with the layout serialized in the current shape
    pub fn to_payload(&self) -> ParseResult<PagePayload> {
        Ok(PagePayload {
            title: self.title.clone(),
            slug: self.slug.clone(),
            status: self.status,
            show_in_nav: self.show_in_nav,
            meta_description: self.seo.description.clone(),
            meta_keywords: self.seo.keywords.clone(),
            layout_json: Serializer::new().serialize(&self.layout)?,
        })
    }

    /// Rebuild a page from a stored record.
    ///
    /// An unreadable layout document is replaced by the starter layout.
    pub fn from_record(record: PageRecord, ids: &mut IDGenerator) -> Self {
        let layout = parse_or_starter(&record.payload.layout_json, ids);
        Self {
            id: Some(record.id),
            title: record.payload.title,
            slug: record.payload.slug,
            status: record.payload.status,
            show_in_nav: record.payload.show_in_nav,
            seo: Seo {
                description: record.payload.meta_description,
                keywords: record.payload.meta_keywords,
            },
            layout,
        }
    }
}

/// URL slug for a title: lowercase ASCII alphanumerics separated by single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
