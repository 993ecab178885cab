//! # Page persistence
//!
//! The editor talks to its backing store through [`PageStore`]. Every call
//! is a single request; the editor never issues two saves at once.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process map, with scripted failures for tests
//! - [`FileStore`]: one `page-<crc32>.json` file per page in a directory,
//!   plus optional `blocks.json` / `forms.json` serving the module library

use crate::catalog::{BlockDescriptor, CatalogSource, FormDescriptor};
use crate::page::PageStatus;
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

pub const PAGE_FILE_PREFIX: &str = "page-";
pub const BLOCKS_FILE: &str = "blocks.json";
pub const FORMS_FILE: &str = "forms.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store reported success without data")]
    EmptyResponse,
}

/// Page fields sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(default)]
    pub show_in_nav: bool,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub meta_keywords: String,
    /// Serialized layout document
    #[serde(default)]
    pub layout_json: String,
}

/// A stored page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: String,
    #[serde(flatten)]
    pub payload: PagePayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response envelope used on the wire: `{ success, data?, error? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> StoreResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<T, StoreError> {
        if self.success {
            self.data.ok_or(StoreError::EmptyResponse)
        } else {
            Err(StoreError::Transport(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

impl<T> From<Result<T, StoreError>> for StoreResponse<T> {
    fn from(result: Result<T, StoreError>) -> Self {
        match result {
            Ok(data) => StoreResponse::ok(data),
            Err(e) => StoreResponse::failure(e.to_string()),
        }
    }
}

/// Backing store for pages
#[allow(async_fn_in_trait)]
pub trait PageStore {
    async fn get_page(&self, id: &str) -> Result<PageRecord, StoreError>;

    async fn create_page(&self, payload: &PagePayload) -> Result<PageRecord, StoreError>;

    async fn update_page(&self, id: &str, payload: &PagePayload) -> Result<PageRecord, StoreError>;

    async fn list_pages(&self) -> Result<Vec<PageRecord>, StoreError>;

    async fn delete_page(&self, id: &str) -> Result<(), StoreError>;
}

/// Salted ids tried when a slug's own id is held by a renamed page
const MAX_ID_ATTEMPTS: u32 = 64;

/// Page id for a slug, stable across runs
pub fn get_page_id(slug: &str) -> String {
    salted_page_id(slug, 0)
}

fn salted_page_id(slug: &str, attempt: u32) -> String {
    let mut hasher = Hasher::new();
    if attempt == 0 {
        hasher.update(format!("page://{}", slug).as_bytes());
    } else {
        hasher.update(format!("page://{}#{}", slug, attempt).as_bytes());
    }
    format!("{}{:08x}", PAGE_FILE_PREFIX, hasher.finalize())
}

#[derive(Default)]
struct MemoryState {
    pages: BTreeMap<String, PageRecord>,
    failures: VecDeque<String>,
    blocks: Vec<BlockDescriptor>,
    forms: Vec<FormDescriptor>,
    next_id: u64,
    requests: usize,
}

impl MemoryState {
    /// Pop a scripted failure, if one is queued
    fn scripted<T>(&mut self) -> Option<Result<T, StoreError>> {
        self.requests += 1;
        self.failures
            .pop_front()
            .map(|error| StoreResponse::<T>::failure(error).into_result())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next request fail with `error`
    pub async fn fail_next(&self, error: impl Into<String>) {
        self.state.lock().await.failures.push_back(error.into());
    }

    /// Number of requests the store has received
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests
    }

    pub async fn set_library(&self, blocks: Vec<BlockDescriptor>, forms: Vec<FormDescriptor>) {
        let mut state = self.state.lock().await;
        state.blocks = blocks;
        state.forms = forms;
    }

    /// Insert a record as-is
    pub async fn insert(&self, record: PageRecord) {
        self.state.lock().await.pages.insert(record.id.clone(), record);
    }
}

impl PageStore for MemoryStore {
    async fn get_page(&self, id: &str) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        state
            .pages
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create_page(&self, payload: &PagePayload) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        state.next_id += 1;
        let now = Utc::now();
        let record = PageRecord {
            id: state.next_id.to_string(),
            payload: payload.clone(),
            created_at: now,
            updated_at: now,
        };
        state.pages.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_page(&self, id: &str, payload: &PagePayload) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        let record = state
            .pages
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.payload = payload.clone();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn list_pages(&self) -> Result<Vec<PageRecord>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        Ok(state.pages.values().cloned().collect())
    }

    async fn delete_page(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        state
            .pages
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl CatalogSource for MemoryStore {
    async fn fetch_blocks(&self) -> Result<Vec<BlockDescriptor>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        Ok(state.blocks.clone())
    }

    async fn fetch_forms(&self) -> Result<Vec<FormDescriptor>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.scripted() {
            return failure;
        }
        Ok(state.forms.clone())
    }
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn page_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    async fn read_record(&self, path: &Path) -> Result<PageRecord, StoreError> {
        let source = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&source)?)
    }

    /// Write to a sibling temp file, then rename over the target
    async fn write_record(&self, record: &PageRecord) -> Result<(), StoreError> {
        self.ensure_dir().await?;
        let path = self.page_path(&record.id);
        let tmp = self.root.join(format!(".{}.json.tmp", record.id));

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Wrote page {} to {}", record.id, path.display());
        Ok(())
    }

    /// First id for `slug` with no page file behind it
    async fn free_page_id(&self, slug: &str) -> Result<String, StoreError> {
        for attempt in 0..MAX_ID_ATTEMPTS {
            let id = salted_page_id(slug, attempt);
            if !tokio::fs::try_exists(self.page_path(&id)).await? {
                if attempt > 0 {
                    tracing::debug!("Id for slug '{}' is taken, using {}", slug, id);
                }
                return Ok(id);
            }
        }
        Err(StoreError::Conflict(format!("no free page id for slug '{}'", slug)))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRecord>, StoreError> {
        Ok(self
            .list_pages()
            .await?
            .into_iter()
            .find(|record| record.payload.slug == slug))
    }

    async fn read_library<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.root.join(file);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let source = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&source)?)
    }
}

impl PageStore for FileStore {
    async fn get_page(&self, id: &str) -> Result<PageRecord, StoreError> {
        let path = self.page_path(id);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.read_record(&path).await
    }

    async fn create_page(&self, payload: &PagePayload) -> Result<PageRecord, StoreError> {
        if let Some(existing) = self.find_by_slug(&payload.slug).await? {
            return Err(StoreError::Conflict(format!(
                "slug '{}' is already used by {}",
                payload.slug, existing.id
            )));
        }

        let id = self.free_page_id(&payload.slug).await?;

        let now = Utc::now();
        let record = PageRecord {
            id,
            payload: payload.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write_record(&record).await?;
        tracing::info!("Created page {} ({})", record.id, record.payload.slug);
        Ok(record)
    }

    async fn update_page(&self, id: &str, payload: &PagePayload) -> Result<PageRecord, StoreError> {
        let mut record = self.get_page(id).await?;

        if record.payload.slug != payload.slug {
            if let Some(existing) = self.find_by_slug(&payload.slug).await? {
                return Err(StoreError::Conflict(format!(
                    "slug '{}' is already used by {}",
                    payload.slug, existing.id
                )));
            }
        }

        record.payload = payload.clone();
        record.updated_at = Utc::now();
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn list_pages(&self) -> Result<Vec<PageRecord>, StoreError> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(PAGE_FILE_PREFIX) || !name.ends_with(".json") {
                continue;
            }
            match self.read_record(&entry.path()).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable page file {}: {}", name, e),
            }
        }

        records.sort_by(|a, b| a.payload.slug.cmp(&b.payload.slug));
        Ok(records)
    }

    async fn delete_page(&self, id: &str) -> Result<(), StoreError> {
        let path = self.page_path(id);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tokio::fs::remove_file(&path).await?;
        tracing::info!("Deleted page {}", id);
        Ok(())
    }
}

impl CatalogSource for FileStore {
    async fn fetch_blocks(&self) -> Result<Vec<BlockDescriptor>, StoreError> {
        self.read_library(BLOCKS_FILE).await
    }

    async fn fetch_forms(&self) -> Result<Vec<FormDescriptor>, StoreError> {
        self.read_library(FORMS_FILE).await
    }
}
