pub mod catalog;
pub mod check;
pub mod edit;
pub mod init;
pub mod list;
pub mod new;
pub mod render;
pub mod show;

pub use catalog::{catalog, CatalogArgs};
pub use check::{check, CheckArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};
pub use new::{new, NewArgs};
pub use render::{render, RenderArgs};
pub use show::{show, ShowArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use pagesmith_editor::{FileStore, PageRecord, PageStore, StoreError};

/// Page store described by the config
pub fn open_store(config: &Config, cwd: &str) -> FileStore {
    FileStore::new(config.get_store_dir(cwd))
}

/// Look a page up by id, falling back to its slug
pub async fn find_page(store: &FileStore, key: &str) -> Result<PageRecord> {
    match store.get_page(key).await {
        Ok(record) => Ok(record),
        Err(StoreError::NotFound(_)) => store
            .list_pages()
            .await?
            .into_iter()
            .find(|record| record.payload.slug == key)
            .ok_or_else(|| anyhow!("No page with id or slug '{}'", key)),
        Err(e) => Err(e.into()),
    }
}
