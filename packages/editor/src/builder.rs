//! # Page builder
//!
//! Owns the page being edited and drives its load/save lifecycle.
//!
//! ```text
//! Idle ─load─▶ Loading ─┬─▶ Ready ◀──────────────┐
//!                       └─▶ LoadFailed           │ tick() after notice
//!              Ready ─save─▶ Saving ─┬─▶ SaveSucceeded
//!                                    └─▶ SaveFailed
//! ```
//!
//! The layout tree is only reachable through `&self`; every change goes
//! through a [`LayoutMutation`]. Saving takes `&mut self`, so at most one
//! save is ever in flight. A failed save never rolls the tree back.

use crate::catalog::{CatalogSource, ModuleCatalog};
use crate::config::EditorConfig;
use crate::drag::{DragController, DragScope};
use crate::errors::EditorError;
use crate::mutations::{LayoutMutation, MutationOutcome};
use crate::page::{slugify, Page, PageStatus, Seo};
use crate::store::PageStore;
use pagesmith_layout::{preset_by_name, preset_name, starter_layout, IDGenerator, Layout, SectionKind};
use serde_json::{Map, Value};
use std::time::Instant;

/// Lifecycle phase of the builder
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    LoadFailed { error: String },
    Saving,
    /// Confirmation shown until `until`
    SaveSucceeded { until: Instant },
    /// Error shown until `until` or the next save attempt
    SaveFailed { error: String, until: Instant },
}

impl Phase {
    /// Whether the page can be edited and saved in this phase
    pub fn is_editable(&self) -> bool {
        matches!(self, Phase::Ready | Phase::SaveSucceeded { .. } | Phase::SaveFailed { .. })
    }

    /// User-visible message for this phase, if any
    pub fn notice(&self) -> Option<&str> {
        match self {
            Phase::LoadFailed { error } | Phase::SaveFailed { error, .. } => Some(error),
            Phase::SaveSucceeded { .. } => Some("Page saved"),
            _ => None,
        }
    }
}

pub struct PageBuilder<S: PageStore> {
    store: S,
    config: EditorConfig,
    page: Page,
    ids: IDGenerator,
    drag: DragController,
    catalog: ModuleCatalog,
    phase: Phase,
    /// Set once the slug was edited by hand; stops title-driven slugs
    slug_edited: bool,
}

impl<S: PageStore> PageBuilder<S> {
    pub fn new(store: S, config: EditorConfig) -> Self {
        Self {
            store,
            ids: IDGenerator::new(config.id_baseline),
            config,
            page: Page::new(Layout::default()),
            drag: DragController::new(),
            catalog: ModuleCatalog::new(),
            phase: Phase::Idle,
            slug_edited: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn layout(&self) -> &Layout {
        &self.page.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Start editing a fresh page holding the starter layout
    pub fn new_page(&mut self) {
        self.ids = IDGenerator::new(self.config.id_baseline);
        self.page = Page::new(starter_layout(&mut self.ids));
        self.slug_edited = false;
        self.drag.cancel();
        self.phase = Phase::Ready;
    }

    /// Load a stored page.
    ///
    /// A transport failure leaves the builder in [`Phase::LoadFailed`]. An
    /// unreadable layout document is replaced by the starter layout.
    pub async fn load(&mut self, id: &str) -> Result<(), EditorError> {
        tracing::info!("Loading page {}", id);
        self.phase = Phase::Loading;
        self.drag.cancel();

        match self.store.get_page(id).await {
            Ok(record) => {
                self.ids = IDGenerator::new(self.config.id_baseline);
                self.page = Page::from_record(record, &mut self.ids);
                self.slug_edited = !self.page.slug.is_empty();
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load page {}: {}", id, e);
                self.phase = Phase::LoadFailed { error: e.to_string() };
                Err(e.into())
            }
        }
    }

    /// Persist the page; returns the page id.
    ///
    /// Required fields are checked first and a failure never reaches the store.
    pub async fn save(&mut self) -> Result<String, EditorError> {
        match self.phase {
            Phase::Saving => return Err(EditorError::SaveInProgress),
            ref phase if !phase.is_editable() => return Err(EditorError::NotReady),
            _ => {}
        }

        if let Err(e) = self.page.validate() {
            self.fail_save(e.to_string());
            return Err(e.into());
        }

        let payload = match self.page.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.fail_save(e.to_string());
                return Err(e.into());
            }
        };

        self.phase = Phase::Saving;
        let result = match &self.page.id {
            Some(id) => self.store.update_page(id, &payload).await,
            None => self.store.create_page(&payload).await,
        };

        match result {
            Ok(record) => {
                tracing::info!("Saved page {} ({})", record.id, record.payload.slug);
                self.page.id = Some(record.id.clone());
                self.phase = Phase::SaveSucceeded {
                    until: Instant::now() + self.config.success_notice,
                };
                Ok(record.id)
            }
            Err(e) => {
                tracing::warn!("Failed to save page: {}", e);
                self.fail_save(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Recover from a save whose future was dropped before completing
    pub fn abandon_save(&mut self) {
        if self.phase == Phase::Saving {
            self.phase = Phase::Ready;
        }
    }

    fn fail_save(&mut self, error: String) {
        self.phase = Phase::SaveFailed {
            error,
            until: Instant::now() + self.config.error_notice,
        };
    }

    /// Expire save notices whose display window has passed
    pub fn tick(&mut self, now: Instant) {
        let expired = match &self.phase {
            Phase::SaveSucceeded { until } | Phase::SaveFailed { until, .. } => now >= *until,
            _ => false,
        };
        if expired {
            self.phase = Phase::Ready;
        }
    }

    // Page metadata

    /// Set the title; the slug follows it until edited by hand
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.page.title = title.into();
        if !self.slug_edited {
            self.page.slug = slugify(&self.page.title);
        }
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.page.slug = slug.into().trim().to_string();
        self.slug_edited = !self.page.slug.is_empty();
    }

    pub fn set_status(&mut self, status: PageStatus) {
        self.page.status = status;
    }

    pub fn set_show_in_nav(&mut self, show: bool) {
        self.page.show_in_nav = show;
    }

    pub fn set_seo(&mut self, seo: Seo) {
        self.page.seo = seo;
    }

    // Layout editing

    /// Apply a mutation to the page layout
    pub fn apply(&mut self, mutation: LayoutMutation) -> Result<MutationOutcome, EditorError> {
        if !self.phase.is_editable() {
            return Err(EditorError::NotReady);
        }
        Ok(mutation.apply(&mut self.page.layout, &mut self.ids)?)
    }

    pub fn add_section(&mut self) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::AddSection)
    }

    pub fn duplicate_section(&mut self, section_id: &str) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::DuplicateSection {
            section_id: section_id.to_string(),
        })
    }

    /// Delete a section; the last remaining section cannot be deleted
    pub fn delete_section(&mut self, section_id: &str) -> Result<MutationOutcome, EditorError> {
        if self.page.layout.section(section_id).is_some() && !self.can_delete_section() {
            return Err(EditorError::LastSection);
        }
        self.apply(LayoutMutation::DeleteSection {
            section_id: section_id.to_string(),
        })
    }

    pub fn rename_section(&mut self, section_id: &str, name: &str) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateSection {
            section_id: section_id.to_string(),
            name: Some(name.to_string()),
            kind: None,
        })
    }

    pub fn set_section_kind(&mut self, section_id: &str, kind: SectionKind) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateSection {
            section_id: section_id.to_string(),
            name: None,
            kind: Some(kind),
        })
    }

    pub fn update_section_style(
        &mut self,
        section_id: &str,
        style: Map<String, Value>,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateSectionStyle {
            section_id: section_id.to_string(),
            style,
        })
    }

    pub fn add_row(&mut self, section_id: &str) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::AddRowToSection {
            section_id: section_id.to_string(),
        })
    }

    pub fn duplicate_row(&mut self, section_id: &str, row_id: &str) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::DuplicateRow {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
        })
    }

    pub fn delete_row(&mut self, section_id: &str, row_id: &str) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::DeleteRow {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
        })
    }

    pub fn change_row_layout(
        &mut self,
        section_id: &str,
        row_id: &str,
        widths: Vec<f64>,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::ChangeRowLayout {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            widths,
        })
    }

    /// Change a row to a named preset such as `"1/3 + 2/3"`
    pub fn apply_row_preset(
        &mut self,
        section_id: &str,
        row_id: &str,
        preset: &str,
    ) -> Result<MutationOutcome, EditorError> {
        let preset = preset_by_name(preset).ok_or_else(|| EditorError::UnknownPreset(preset.to_string()))?;
        self.change_row_layout(section_id, row_id, preset.widths.to_vec())
    }

    pub fn update_row_settings(
        &mut self,
        section_id: &str,
        row_id: &str,
        settings: Map<String, Value>,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateRowSettings {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            settings,
        })
    }

    pub fn update_row_style(
        &mut self,
        section_id: &str,
        row_id: &str,
        style: Map<String, Value>,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateRowStyle {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            style,
        })
    }

    pub fn update_column_style(
        &mut self,
        section_id: &str,
        row_id: &str,
        column_id: &str,
        style: Map<String, Value>,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::UpdateColumnStyle {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            style,
        })
    }

    /// Insert a module from the catalog entry `key`
    pub fn add_module(
        &mut self,
        section_id: &str,
        row_id: &str,
        column_id: &str,
        key: &str,
    ) -> Result<MutationOutcome, EditorError> {
        let template = self
            .catalog
            .get(key)
            .cloned()
            .ok_or_else(|| EditorError::UnknownModule(key.to_string()))?;
        self.apply(LayoutMutation::AddModuleToColumn {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            template,
        })
    }

    pub fn remove_module(
        &mut self,
        section_id: &str,
        row_id: &str,
        column_id: &str,
        index: usize,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::RemoveModuleFromColumn {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            index,
        })
    }

    pub fn reorder_modules(
        &mut self,
        section_id: &str,
        row_id: &str,
        column_id: &str,
        from: usize,
        to: usize,
    ) -> Result<MutationOutcome, EditorError> {
        self.apply(LayoutMutation::ReorderModulesInColumn {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            from,
            to,
        })
    }

    // Queries

    pub fn can_delete_section(&self) -> bool {
        self.page.layout.can_delete_section()
    }

    /// Rows can always be deleted while the section exists
    pub fn can_delete_row(&self, section_id: &str) -> bool {
        self.page
            .layout
            .section(section_id)
            .map(|s| !s.rows.is_empty())
            .unwrap_or(false)
    }

    /// Preset name for a row's widths, or `"Custom"`
    pub fn row_layout_name(&self, section_id: &str, row_id: &str) -> Option<&'static str> {
        let row = self.page.layout.section(section_id)?.row(row_id)?;
        Some(preset_name(&row.widths()))
    }

    // Drag and drop

    pub fn start_drag(&mut self, active_id: impl Into<String>, scope: DragScope) {
        self.drag.start(active_id, scope);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Finish the active drag over `over_id`.
    ///
    /// Returns `Ok(None)` when the drop does not change the order.
    pub fn drop_on(&mut self, over_id: Option<&str>) -> Result<Option<MutationOutcome>, EditorError> {
        if !self.drag.is_dragging() {
            return Err(EditorError::NoActiveDrag);
        }
        match self.drag.drop(over_id, &self.page.layout) {
            Some(mutation) => self.apply(mutation).map(Some),
            None => Ok(None),
        }
    }

    // Module library

    /// Refresh blocks and forms from `source`; returns fetch errors
    pub async fn refresh_catalog<C: CatalogSource>(&mut self, source: &C) -> Vec<String> {
        self.catalog.refresh(source).await
    }
}

impl<S: PageStore + CatalogSource> PageBuilder<S> {
    /// Refresh blocks and forms from the page store itself
    pub async fn refresh_library(&mut self) -> Vec<String> {
        self.catalog.refresh(&self.store).await
    }
}
