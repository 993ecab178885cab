//! # Pagesmith Editor
//!
//! Editing engine for page layouts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ layout: document ⇄ Section tree             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: PageBuilder                         │
//! │  - Load/save pages through a PageStore      │
//! │  - Apply mutations with validation          │
//! │  - Drag reordering within one sibling list  │
//! │  - Module catalog (built-ins, blocks, forms)│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: Section tree → HTML               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagesmith_editor::{EditorConfig, FileStore, PageBuilder};
//!
//! let mut builder = PageBuilder::new(FileStore::new("pages"), EditorConfig::default());
//! builder.new_page();
//! builder.set_title("Summer Gala");
//!
//! let section_id = builder.add_section()?.created_id.unwrap();
//! builder.add_row(&section_id)?;
//!
//! builder.save().await?;
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod drag;
pub mod errors;
pub mod mutations;
pub mod page;
pub mod store;

pub use builder::{PageBuilder, Phase};
pub use catalog::{
    fetch_library, BlockDescriptor, CatalogSource, FormDescriptor, LibraryFetch, ModuleCatalog, ModuleTemplate,
};
pub use config::EditorConfig;
pub use drag::{array_move, compute_move, reordered, DragController, DragScope, DragState};
pub use errors::EditorError;
pub use mutations::{LayoutMutation, MutationError, MutationOutcome};
pub use page::{slugify, Page, PageStatus, Seo, ValidationError};
pub use store::{
    get_page_id, FileStore, MemoryStore, PagePayload, PageRecord, PageStore, StoreError, StoreResponse,
};
