//! # Layout Mutations
//!
//! Structural operations on the section tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one operator action (add, duplicate, delete, move)
//! 2. **Validated**: targets are resolved before anything changes
//! 3. **All or nothing**: a failed mutation leaves the tree exactly as it was
//!
//! ## Mutation Semantics
//!
//! ### Duplicate
//! - Deep copy inserted right after the source
//! - Every section, row, column and module in the copy gets a fresh id
//! - The copy shares nothing with the original
//!
//! ### ChangeRowLayout
//! - One column per requested width
//! - Columns at surviving indices keep id, style and modules
//! - Columns past the new count are dropped together with their modules
//!
//! ### Address failures
//! - An id that does not resolve fails with [`MutationError::NotFound`]
//!   naming the deepest level that could not be found

use crate::catalog::ModuleTemplate;
use crate::drag::array_move;
use pagesmith_layout::id_generator::{COLUMN_PREFIX, MODULE_PREFIX, ROW_PREFIX, SECTION_PREFIX};
use pagesmith_layout::{
    blank_row, blank_section, Address, Column, IDGenerator, Layout, Row, Section, SectionKind, StyleError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Suffix appended to the name of a duplicated section
pub const COPY_SUFFIX: &str = " (Copy)";

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LayoutMutation {
    /// Append a section holding one row with a single full-width column
    AddSection,

    DuplicateSection {
        section_id: String,
    },

    DeleteSection {
        section_id: String,
    },

    /// Rename or retag a section
    UpdateSection {
        section_id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        kind: Option<SectionKind>,
    },

    UpdateSectionStyle {
        section_id: String,
        style: Map<String, Value>,
    },

    MoveSection {
        from: usize,
        to: usize,
    },

    AddRowToSection {
        section_id: String,
    },

    DuplicateRow {
        section_id: String,
        row_id: String,
    },

    DeleteRow {
        section_id: String,
        row_id: String,
    },

    MoveRow {
        section_id: String,
        from: usize,
        to: usize,
    },

    ChangeRowLayout {
        section_id: String,
        row_id: String,
        widths: Vec<f64>,
    },

    /// Shallow-merge into the row's settings; `null` removes a key
    UpdateRowSettings {
        section_id: String,
        row_id: String,
        settings: Map<String, Value>,
    },

    UpdateRowStyle {
        section_id: String,
        row_id: String,
        style: Map<String, Value>,
    },

    UpdateColumnStyle {
        section_id: String,
        row_id: String,
        column_id: String,
        style: Map<String, Value>,
    },

    /// Append a copy of `template` with a fresh id
    AddModuleToColumn {
        section_id: String,
        row_id: String,
        column_id: String,
        template: ModuleTemplate,
    },

    RemoveModuleFromColumn {
        section_id: String,
        row_id: String,
        column_id: String,
        index: usize,
    },

    ReorderModulesInColumn {
        section_id: String,
        row_id: String,
        column_id: String,
        from: usize,
        to: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Not found: {0}")]
    NotFound(Address),

    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid style: {0}")]
    Style(#[from] StyleError),
}

/// Result of applying a mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Id of the node the mutation created, if any
    pub created_id: Option<String>,
}

impl MutationOutcome {
    fn created(id: &str) -> Self {
        Self {
            created_id: Some(id.to_string()),
        }
    }
}

type MutationResult = Result<MutationOutcome, MutationError>;

impl LayoutMutation {
    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            LayoutMutation::AddSection => "AddSection",
            LayoutMutation::DuplicateSection { .. } => "DuplicateSection",
            LayoutMutation::DeleteSection { .. } => "DeleteSection",
            LayoutMutation::UpdateSection { .. } => "UpdateSection",
            LayoutMutation::UpdateSectionStyle { .. } => "UpdateSectionStyle",
            LayoutMutation::MoveSection { .. } => "MoveSection",
            LayoutMutation::AddRowToSection { .. } => "AddRowToSection",
            LayoutMutation::DuplicateRow { .. } => "DuplicateRow",
            LayoutMutation::DeleteRow { .. } => "DeleteRow",
            LayoutMutation::MoveRow { .. } => "MoveRow",
            LayoutMutation::ChangeRowLayout { .. } => "ChangeRowLayout",
            LayoutMutation::UpdateRowSettings { .. } => "UpdateRowSettings",
            LayoutMutation::UpdateRowStyle { .. } => "UpdateRowStyle",
            LayoutMutation::UpdateColumnStyle { .. } => "UpdateColumnStyle",
            LayoutMutation::AddModuleToColumn { .. } => "AddModuleToColumn",
            LayoutMutation::RemoveModuleFromColumn { .. } => "RemoveModuleFromColumn",
            LayoutMutation::ReorderModulesInColumn { .. } => "ReorderModulesInColumn",
        }
    }

    /// Apply mutation to the layout with validation
    pub fn apply(&self, layout: &mut Layout, ids: &mut IDGenerator) -> MutationResult {
        // Validate first so a failure never leaves a half-applied tree
        self.validate(layout)?;
        tracing::debug!("Applying {}", self.name());

        match self {
            LayoutMutation::AddSection => Ok(Self::apply_add_section(layout, ids)),

            LayoutMutation::DuplicateSection { section_id } => Self::apply_duplicate_section(layout, ids, section_id),

            LayoutMutation::DeleteSection { section_id } => {
                layout.sections.retain(|s| &s.id != section_id);
                Ok(MutationOutcome::default())
            }

            LayoutMutation::UpdateSection { section_id, name, kind } => {
                let section = find_section(layout, section_id)?;
                if let Some(name) = name {
                    section.name = name.clone();
                }
                if let Some(kind) = kind {
                    section.kind = kind.clone();
                }
                Ok(MutationOutcome::default())
            }

            LayoutMutation::UpdateSectionStyle { section_id, style } => {
                let section = find_section(layout, section_id)?;
                section.style = section.style.merged(style)?;
                Ok(MutationOutcome::default())
            }

            LayoutMutation::MoveSection { from, to } => {
                Self::apply_move(&mut layout.sections, *from, *to)
            }

            LayoutMutation::AddRowToSection { section_id } => {
                let section = find_section(layout, section_id)?;
                let row = blank_row(ids);
                let outcome = MutationOutcome::created(&row.id);
                section.rows.push(row);
                Ok(outcome)
            }

            LayoutMutation::DuplicateRow { section_id, row_id } => {
                let section = find_section(layout, section_id)?;
                let index = section
                    .row_index(row_id)
                    .ok_or_else(|| MutationError::NotFound(Address::row(section_id, row_id)))?;
                let copy = copy_row(&section.rows[index], ids);
                let outcome = MutationOutcome::created(&copy.id);
                section.rows.insert(index + 1, copy);
                Ok(outcome)
            }

            LayoutMutation::DeleteRow { section_id, row_id } => {
                let section = find_section(layout, section_id)?;
                section.rows.retain(|r| &r.id != row_id);
                Ok(MutationOutcome::default())
            }

            LayoutMutation::MoveRow { section_id, from, to } => {
                let section = find_section(layout, section_id)?;
                Self::apply_move(&mut section.rows, *from, *to)
            }

            LayoutMutation::ChangeRowLayout {
                section_id,
                row_id,
                widths,
            } => {
                let row = find_row(layout, section_id, row_id)?;
                change_row_layout(row, widths, ids);
                Ok(MutationOutcome::default())
            }

            LayoutMutation::UpdateRowSettings {
                section_id,
                row_id,
                settings,
            } => {
                let row = find_row(layout, section_id, row_id)?;
                for (key, value) in settings {
                    if value.is_null() {
                        row.settings.remove(key);
                    } else {
                        row.settings.insert(key.clone(), value.clone());
                    }
                }
                Ok(MutationOutcome::default())
            }

            LayoutMutation::UpdateRowStyle {
                section_id,
                row_id,
                style,
            } => {
                let row = find_row(layout, section_id, row_id)?;
                row.style = row.style.merged(style)?;
                Ok(MutationOutcome::default())
            }

            LayoutMutation::UpdateColumnStyle {
                section_id,
                row_id,
                column_id,
                style,
            } => {
                let column = find_column(layout, section_id, row_id, column_id)?;
                column.style = column.style.merged(style)?;
                Ok(MutationOutcome::default())
            }

            LayoutMutation::AddModuleToColumn {
                section_id,
                row_id,
                column_id,
                template,
            } => {
                let column = find_column(layout, section_id, row_id, column_id)?;
                let module = template.instantiate(ids.new_id(MODULE_PREFIX));
                let outcome = MutationOutcome::created(&module.id);
                column.modules.push(module);
                Ok(outcome)
            }

            LayoutMutation::RemoveModuleFromColumn {
                section_id,
                row_id,
                column_id,
                index,
            } => {
                let column = find_column(layout, section_id, row_id, column_id)?;
                column.modules.remove(*index);
                Ok(MutationOutcome::default())
            }

            LayoutMutation::ReorderModulesInColumn {
                section_id,
                row_id,
                column_id,
                from,
                to,
            } => {
                let column = find_column(layout, section_id, row_id, column_id)?;
                Self::apply_move(&mut column.modules, *from, *to)
            }
        }
    }

    /// Pure form of [`LayoutMutation::apply`]: returns the new tree, `layout` is untouched
    pub fn applied_to(&self, layout: &Layout, ids: &mut IDGenerator) -> Result<(Layout, MutationOutcome), MutationError> {
        let mut next = layout.clone();
        let outcome = self.apply(&mut next, ids)?;
        Ok((next, outcome))
    }

    fn apply_add_section(layout: &mut Layout, ids: &mut IDGenerator) -> MutationOutcome {
        let name = format!("Section {}", layout.sections.len() + 1);
        let section = blank_section(ids, &name, SectionKind::Content);
        let outcome = MutationOutcome::created(&section.id);
        layout.sections.push(section);
        outcome
    }

    fn apply_duplicate_section(layout: &mut Layout, ids: &mut IDGenerator, section_id: &str) -> MutationResult {
        let index = layout
            .section_index(section_id)
            .ok_or_else(|| MutationError::NotFound(Address::section(section_id)))?;

        let copy = copy_section(&layout.sections[index], ids);
        let outcome = MutationOutcome::created(&copy.id);
        layout.sections.insert(index + 1, copy);
        Ok(outcome)
    }

    fn apply_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> MutationResult {
        let len = items.len();
        if !array_move(items, from, to) {
            let index = if from >= len { from } else { to };
            return Err(MutationError::IndexOutOfRange { index, len });
        }
        Ok(MutationOutcome::default())
    }

    /// Validate without applying
    pub fn validate(&self, layout: &Layout) -> Result<(), MutationError> {
        match self {
            LayoutMutation::AddSection => Ok(()),

            LayoutMutation::DuplicateSection { section_id }
            | LayoutMutation::DeleteSection { section_id }
            | LayoutMutation::UpdateSection { section_id, .. }
            | LayoutMutation::AddRowToSection { section_id } => {
                resolve_section(layout, section_id)?;
                Ok(())
            }

            LayoutMutation::UpdateSectionStyle { section_id, style } => {
                let section = resolve_section(layout, section_id)?;
                section.style.merged(style)?;
                Ok(())
            }

            LayoutMutation::MoveSection { from, to } => check_move(layout.sections.len(), *from, *to),

            LayoutMutation::DuplicateRow { section_id, row_id }
            | LayoutMutation::DeleteRow { section_id, row_id }
            | LayoutMutation::UpdateRowSettings { section_id, row_id, .. } => {
                resolve_row(layout, section_id, row_id)?;
                Ok(())
            }

            LayoutMutation::MoveRow { section_id, from, to } => {
                let section = resolve_section(layout, section_id)?;
                check_move(section.rows.len(), *from, *to)
            }

            LayoutMutation::ChangeRowLayout {
                section_id,
                row_id,
                widths,
            } => {
                resolve_row(layout, section_id, row_id)?;
                if widths.is_empty() {
                    return Err(MutationError::InvalidLayout("a row needs at least one column".to_string()));
                }
                if let Some(bad) = widths.iter().find(|w| !w.is_finite() || **w <= 0.0) {
                    return Err(MutationError::InvalidLayout(format!("invalid column width {}", bad)));
                }
                Ok(())
            }

            LayoutMutation::UpdateRowStyle {
                section_id,
                row_id,
                style,
            } => {
                let row = resolve_row(layout, section_id, row_id)?;
                row.style.merged(style)?;
                Ok(())
            }

            LayoutMutation::UpdateColumnStyle {
                section_id,
                row_id,
                column_id,
                style,
            } => {
                let column = resolve_column(layout, section_id, row_id, column_id)?;
                column.style.merged(style)?;
                Ok(())
            }

            LayoutMutation::AddModuleToColumn {
                section_id,
                row_id,
                column_id,
                ..
            } => {
                resolve_column(layout, section_id, row_id, column_id)?;
                Ok(())
            }

            LayoutMutation::RemoveModuleFromColumn {
                section_id,
                row_id,
                column_id,
                index,
            } => {
                let column = resolve_column(layout, section_id, row_id, column_id)?;
                if *index >= column.modules.len() {
                    return Err(MutationError::IndexOutOfRange {
                        index: *index,
                        len: column.modules.len(),
                    });
                }
                Ok(())
            }

            LayoutMutation::ReorderModulesInColumn {
                section_id,
                row_id,
                column_id,
                from,
                to,
            } => {
                let column = resolve_column(layout, section_id, row_id, column_id)?;
                check_move(column.modules.len(), *from, *to)
            }
        }
    }
}

fn check_move(len: usize, from: usize, to: usize) -> Result<(), MutationError> {
    for index in [from, to] {
        if index >= len {
            return Err(MutationError::IndexOutOfRange { index, len });
        }
    }
    Ok(())
}

fn resolve_section<'a>(layout: &'a Layout, section_id: &str) -> Result<&'a Section, MutationError> {
    layout
        .section(section_id)
        .ok_or_else(|| MutationError::NotFound(Address::section(section_id)))
}

fn resolve_row<'a>(layout: &'a Layout, section_id: &str, row_id: &str) -> Result<&'a Row, MutationError> {
    resolve_section(layout, section_id)?
        .row(row_id)
        .ok_or_else(|| MutationError::NotFound(Address::row(section_id, row_id)))
}

fn resolve_column<'a>(
    layout: &'a Layout,
    section_id: &str,
    row_id: &str,
    column_id: &str,
) -> Result<&'a Column, MutationError> {
    resolve_row(layout, section_id, row_id)?
        .column(column_id)
        .ok_or_else(|| MutationError::NotFound(Address::column(section_id, row_id, column_id)))
}

fn find_section<'a>(layout: &'a mut Layout, section_id: &str) -> Result<&'a mut Section, MutationError> {
    layout
        .section_mut(section_id)
        .ok_or_else(|| MutationError::NotFound(Address::section(section_id)))
}

fn find_row<'a>(layout: &'a mut Layout, section_id: &str, row_id: &str) -> Result<&'a mut Row, MutationError> {
    find_section(layout, section_id)?
        .row_mut(row_id)
        .ok_or_else(|| MutationError::NotFound(Address::row(section_id, row_id)))
}

fn find_column<'a>(
    layout: &'a mut Layout,
    section_id: &str,
    row_id: &str,
    column_id: &str,
) -> Result<&'a mut Column, MutationError> {
    find_row(layout, section_id, row_id)?
        .column_mut(column_id)
        .ok_or_else(|| MutationError::NotFound(Address::column(section_id, row_id, column_id)))
}

/// Deep copy of a section with fresh ids at every level.
///
/// A section without rows gets a blank row in its copy.
pub fn copy_section(section: &Section, ids: &mut IDGenerator) -> Section {
    let id = ids.new_id(SECTION_PREFIX);
    let mut rows: Vec<Row> = section.rows.iter().map(|row| copy_row(row, ids)).collect();
    if rows.is_empty() {
        rows.push(blank_row(ids));
    }

    Section {
        id,
        name: format!("{}{}", section.name, COPY_SUFFIX),
        kind: section.kind.clone(),
        style: section.style.clone(),
        rows,
    }
}

/// Deep copy of a row with fresh ids at every level
pub fn copy_row(row: &Row, ids: &mut IDGenerator) -> Row {
    Row {
        id: ids.new_id(ROW_PREFIX),
        style: row.style.clone(),
        settings: row.settings.clone(),
        columns: row
            .columns
            .iter()
            .map(|column| Column {
                id: ids.new_id(COLUMN_PREFIX),
                width: column.width,
                style: column.style.clone(),
                modules: column
                    .modules
                    .iter()
                    .map(|module| {
                        let mut copy = module.clone();
                        copy.id = ids.new_id(MODULE_PREFIX);
                        copy
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn change_row_layout(row: &mut Row, widths: &[f64], ids: &mut IDGenerator) {
    let mut existing = std::mem::take(&mut row.columns).into_iter();

    row.columns = widths
        .iter()
        .map(|&width| match existing.next() {
            Some(mut column) => {
                column.width = width;
                column
            }
            None => Column::new(ids.new_id(COLUMN_PREFIX), width),
        })
        .collect();

    let dropped: usize = existing.map(|c| c.modules.len()).sum();
    if dropped > 0 {
        tracing::debug!("Row {} layout change dropped {} modules", row.id, dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleCatalog;
    use pagesmith_layout::starter_layout;
    use serde_json::json;

    fn setup() -> (Layout, IDGenerator) {
        let mut ids = IDGenerator::new(0);
        let layout = starter_layout(&mut ids);
        (layout, ids)
    }

    fn text_template() -> ModuleTemplate {
        ModuleCatalog::new().get("text").cloned().unwrap()
    }

    fn column_address(layout: &Layout, section: usize) -> (String, String, String) {
        let s = &layout.sections[section];
        (s.id.clone(), s.rows[0].id.clone(), s.rows[0].columns[0].id.clone())
    }

    fn add_text(layout: &mut Layout, ids: &mut IDGenerator, section: usize) -> String {
        let (section_id, row_id, column_id) = column_address(layout, section);
        LayoutMutation::AddModuleToColumn {
            section_id,
            row_id,
            column_id,
            template: text_template(),
        }
        .apply(layout, ids)
        .unwrap()
        .created_id
        .unwrap()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = LayoutMutation::ChangeRowLayout {
            section_id: "section-1".to_string(),
            row_id: "row-2".to_string(),
            widths: vec![50.0, 50.0],
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: LayoutMutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_add_section_appends_blank_section() {
        let (mut layout, mut ids) = setup();
        let outcome = LayoutMutation::AddSection.apply(&mut layout, &mut ids).unwrap();

        let section = layout.sections.last().unwrap();
        assert_eq!(outcome.created_id.as_deref(), Some(section.id.as_str()));
        assert_eq!(section.rows.len(), 1);
        assert_eq!(section.rows[0].widths(), vec![100.0]);
        assert!(section.rows[0].columns[0].modules.is_empty());
    }

    #[test]
    fn test_duplicate_section_inserted_after_original() {
        let (mut layout, mut ids) = setup();
        add_text(&mut layout, &mut ids, 1);
        let original = layout.sections[0].clone();

        LayoutMutation::DuplicateSection {
            section_id: original.id.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        assert_eq!(layout.sections.len(), 3);
        let copy = &layout.sections[1];
        assert_eq!(layout.sections[0], original);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, format!("{}{}", original.name, COPY_SUFFIX));
        assert_ne!(copy.rows[0].id, original.rows[0].id);
        assert_ne!(copy.rows[0].columns[0].id, original.rows[0].columns[0].id);
        assert_ne!(
            copy.rows[0].columns[0].modules[0].id,
            original.rows[0].columns[0].modules[0].id
        );
        assert_eq!(
            copy.rows[0].columns[0].modules[0].default_props,
            original.rows[0].columns[0].modules[0].default_props
        );
    }

    #[test]
    fn test_duplicate_of_empty_section_gets_a_row() {
        let (mut layout, mut ids) = setup();
        let section_id = layout.sections[0].id.clone();
        layout.sections[0].rows.clear();

        LayoutMutation::DuplicateSection {
            section_id: section_id.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        assert!(layout.sections[0].rows.is_empty());
        let copy = &layout.sections[1];
        assert_eq!(copy.rows.len(), 1);
        assert_eq!(copy.rows[0].widths(), vec![100.0]);
        let row_id = copy.rows[0].id.as_str();
        assert_eq!(layout.ids().iter().filter(|id| **id == row_id).count(), 1);
    }

    #[test]
    fn test_duplicate_is_isolated_from_original() {
        let (mut layout, mut ids) = setup();
        let original_id = layout.sections[1].id.clone();
        add_text(&mut layout, &mut ids, 1);

        let copy_id = LayoutMutation::DuplicateSection {
            section_id: original_id.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap()
        .created_id
        .unwrap();
        let before = layout.section(&original_id).cloned().unwrap();

        let (_, row_id, column_id) = column_address(&layout, 2);
        LayoutMutation::RemoveModuleFromColumn {
            section_id: copy_id.clone(),
            row_id: row_id.clone(),
            column_id: column_id.clone(),
            index: 0,
        }
        .apply(&mut layout, &mut ids)
        .unwrap();
        LayoutMutation::UpdateRowStyle {
            section_id: copy_id,
            row_id,
            style: json!({ "padding": "99px" }).as_object().cloned().unwrap(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        assert_eq!(layout.section(&original_id), Some(&before));
    }

    #[test]
    fn test_delete_section() {
        let (mut layout, mut ids) = setup();
        let id = layout.sections[0].id.clone();
        LayoutMutation::DeleteSection { section_id: id.clone() }
            .apply(&mut layout, &mut ids)
            .unwrap();

        assert_eq!(layout.sections.len(), 1);
        assert!(layout.section(&id).is_none());
        assert!(!layout.can_delete_section());
    }

    #[test]
    fn test_unknown_section_is_reported() {
        let (mut layout, mut ids) = setup();
        let before = layout.clone();

        let err = LayoutMutation::AddRowToSection {
            section_id: "missing".to_string(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap_err();

        assert_eq!(err, MutationError::NotFound(Address::section("missing")));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_unknown_column_reports_deepest_level() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, _) = column_address(&layout, 1);
        let before = layout.clone();

        let err = LayoutMutation::AddModuleToColumn {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            column_id: "col-404".to_string(),
            template: text_template(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap_err();

        assert_eq!(err, MutationError::NotFound(Address::column(&section_id, &row_id, "col-404")));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_duplicate_row_spliced_after_source() {
        let (mut layout, mut ids) = setup();
        let section_id = layout.sections[1].id.clone();
        LayoutMutation::AddRowToSection {
            section_id: section_id.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();
        let first_row = layout.sections[1].rows[0].id.clone();
        let second_row = layout.sections[1].rows[1].id.clone();

        let copy_id = LayoutMutation::DuplicateRow {
            section_id: section_id.clone(),
            row_id: first_row.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap()
        .created_id
        .unwrap();

        let order: Vec<&str> = layout.sections[1].rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec![first_row.as_str(), copy_id.as_str(), second_row.as_str()]);
    }

    #[test]
    fn test_delete_row() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, _) = column_address(&layout, 0);
        LayoutMutation::DeleteRow { section_id, row_id }
            .apply(&mut layout, &mut ids)
            .unwrap();
        assert!(layout.sections[0].rows.is_empty());
    }

    #[test]
    fn test_change_row_layout_preserves_modules() {
        let (mut layout, mut ids) = setup();
        let module_id = add_text(&mut layout, &mut ids, 1);
        let (section_id, row_id, column_id) = column_address(&layout, 1);

        LayoutMutation::ChangeRowLayout {
            section_id,
            row_id,
            widths: vec![50.0, 50.0],
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        let columns = &layout.sections[1].rows[0].columns;
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].id, column_id);
        assert_eq!(columns[0].width, 50.0);
        assert_eq!(columns[0].modules[0].id, module_id);
        assert!(columns[1].modules.is_empty());
    }

    #[test]
    fn test_change_row_layout_drops_trailing_columns() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, _) = column_address(&layout, 1);
        let change = |widths: Vec<f64>| LayoutMutation::ChangeRowLayout {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            widths,
        };

        change(vec![25.0, 25.0, 50.0]).apply(&mut layout, &mut ids).unwrap();
        let third = layout.sections[1].rows[0].columns[2].id.clone();
        LayoutMutation::AddModuleToColumn {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            column_id: third,
            template: text_template(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        change(vec![100.0]).apply(&mut layout, &mut ids).unwrap();
        assert_eq!(layout.sections[1].rows[0].columns.len(), 1);
        assert_eq!(layout.module_count(), 1);
    }

    #[test]
    fn test_change_row_layout_rejects_bad_widths() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, _) = column_address(&layout, 1);

        for widths in [vec![], vec![50.0, 0.0], vec![f64::NAN]] {
            let result = LayoutMutation::ChangeRowLayout {
                section_id: section_id.clone(),
                row_id: row_id.clone(),
                widths,
            }
            .apply(&mut layout, &mut ids);
            assert!(matches!(result, Err(MutationError::InvalidLayout(_))));
        }
    }

    #[test]
    fn test_update_row_settings_shallow_merge() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, _) = column_address(&layout, 0);
        let update = |settings: Value| LayoutMutation::UpdateRowSettings {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            settings: settings.as_object().cloned().unwrap(),
        };

        update(json!({ "gap": 16, "fullWidth": true, "custom": { "a": 1 } }))
            .apply(&mut layout, &mut ids)
            .unwrap();
        update(json!({ "gap": 24, "fullWidth": null })).apply(&mut layout, &mut ids).unwrap();

        let settings = &layout.sections[0].rows[0].settings;
        assert_eq!(settings["gap"], 24);
        assert_eq!(settings["custom"]["a"], 1);
        assert!(!settings.contains_key("fullWidth"));
    }

    #[test]
    fn test_update_styles_at_every_level() {
        let (mut layout, mut ids) = setup();
        let (section_id, row_id, column_id) = column_address(&layout, 1);
        let style = |v: Value| v.as_object().cloned().unwrap();

        LayoutMutation::UpdateSectionStyle {
            section_id: section_id.clone(),
            style: style(json!({ "backgroundColor": "#000" })),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();
        LayoutMutation::UpdateRowStyle {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            style: style(json!({ "margin": { "top": 8, "right": 0, "bottom": 8, "left": 0 } })),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();
        LayoutMutation::UpdateColumnStyle {
            section_id,
            row_id,
            column_id,
            style: style(json!({ "textAlign": "right" })),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        let section = &layout.sections[1];
        assert_eq!(section.style.background_color.as_deref(), Some("#000"));
        assert_eq!(section.style.padding.as_deref(), Some("32px 24px"));
        assert_eq!(section.rows[0].style.margin.as_deref(), Some("8px 0 8px 0"));
        assert_eq!(section.rows[0].columns[0].style.text_align.as_deref(), Some("right"));
    }

    #[test]
    fn test_invalid_style_patch_leaves_tree_untouched() {
        let (mut layout, mut ids) = setup();
        let section_id = layout.sections[0].id.clone();
        let before = layout.clone();

        let result = LayoutMutation::UpdateSectionStyle {
            section_id,
            style: json!({ "opacity": [1, 2] }).as_object().cloned().unwrap(),
        }
        .apply(&mut layout, &mut ids);

        assert!(matches!(result, Err(MutationError::Style(_))));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_update_section_name_and_kind() {
        let (mut layout, mut ids) = setup();
        let section_id = layout.sections[1].id.clone();
        LayoutMutation::UpdateSection {
            section_id,
            name: Some("Footer".to_string()),
            kind: Some(SectionKind::Footer),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        assert_eq!(layout.sections[1].name, "Footer");
        assert_eq!(layout.sections[1].kind, SectionKind::Footer);
    }

    #[test]
    fn test_remove_module_out_of_range() {
        let (mut layout, mut ids) = setup();
        add_text(&mut layout, &mut ids, 1);
        let (section_id, row_id, column_id) = column_address(&layout, 1);
        let before = layout.clone();

        let err = LayoutMutation::RemoveModuleFromColumn {
            section_id,
            row_id,
            column_id,
            index: 5,
        }
        .apply(&mut layout, &mut ids)
        .unwrap_err();

        assert_eq!(err, MutationError::IndexOutOfRange { index: 5, len: 1 });
        assert_eq!(layout, before);
    }

    #[test]
    fn test_reorder_modules_is_permutation() {
        let (mut layout, mut ids) = setup();
        let added: Vec<String> = (0..4).map(|_| add_text(&mut layout, &mut ids, 1)).collect();
        let (section_id, row_id, column_id) = column_address(&layout, 1);
        let header_before = layout.sections[0].clone();

        LayoutMutation::ReorderModulesInColumn {
            section_id,
            row_id,
            column_id,
            from: 0,
            to: 2,
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        let order: Vec<&str> = layout.sections[1].rows[0].columns[0]
            .modules
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(order, vec![added[1].as_str(), added[2].as_str(), added[0].as_str(), added[3].as_str()]);
        assert_eq!(layout.sections[0], header_before);
    }

    #[test]
    fn test_move_section_and_row() {
        let (mut layout, mut ids) = setup();
        let first = layout.sections[0].id.clone();

        LayoutMutation::MoveSection { from: 0, to: 1 }
            .apply(&mut layout, &mut ids)
            .unwrap();
        assert_eq!(layout.sections[1].id, first);

        let err = LayoutMutation::MoveSection { from: 0, to: 2 }
            .apply(&mut layout, &mut ids)
            .unwrap_err();
        assert_eq!(err, MutationError::IndexOutOfRange { index: 2, len: 2 });

        let section_id = layout.sections[0].id.clone();
        let err = LayoutMutation::MoveRow {
            section_id,
            from: 1,
            to: 0,
        }
        .apply(&mut layout, &mut ids)
        .unwrap_err();
        assert_eq!(err, MutationError::IndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn test_applied_to_leaves_input_untouched() {
        let (layout, mut ids) = setup();
        let (next, outcome) = LayoutMutation::AddSection.applied_to(&layout, &mut ids).unwrap();

        assert_eq!(layout.sections.len(), 2);
        assert_eq!(next.sections.len(), 3);
        assert!(outcome.created_id.is_some());
    }
}
