//! Tests for longer mutation sequences
//!
//! This tests:
//! - Id uniqueness across every insertion kind
//! - Round trip through the document format after arbitrary edits
//! - Duplicate isolation after follow-up edits
//! - The starter page scenario

use pagesmith_editor::{LayoutMutation, ModuleCatalog, MutationError};
use pagesmith_layout::{parse, serialize, starter_layout, Address, IDGenerator, Layout};
use serde_json::json;
use std::collections::HashSet;

fn template(key: &str) -> pagesmith_editor::ModuleTemplate {
    ModuleCatalog::new().get(key).cloned().unwrap()
}

/// (section, row, column) of the first column of the first row of `section`
fn first_column(layout: &Layout, section: usize) -> (String, String, String) {
    let s = &layout.sections[section];
    let r = &s.rows[0];
    (s.id.clone(), r.id.clone(), r.columns[0].id.clone())
}

fn build_busy_layout() -> (Layout, IDGenerator) {
    let mut ids = IDGenerator::default();
    let mut layout = starter_layout(&mut ids);

    for _ in 0..3 {
        LayoutMutation::AddSection.apply(&mut layout, &mut ids).unwrap();
    }

    for section in 0..layout.sections.len() {
        let section_id = layout.sections[section].id.clone();
        LayoutMutation::AddRowToSection {
            section_id: section_id.clone(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        let row_id = layout.sections[section].rows[1].id.clone();
        LayoutMutation::ChangeRowLayout {
            section_id: section_id.clone(),
            row_id: row_id.clone(),
            widths: vec![33.33, 66.67],
        }
        .apply(&mut layout, &mut ids)
        .unwrap();

        for (i, key) in ["heading", "text", "button"].iter().enumerate() {
            let column_id = layout.sections[section].rows[1].columns[i % 2].id.clone();
            LayoutMutation::AddModuleToColumn {
                section_id: section_id.clone(),
                row_id: row_id.clone(),
                column_id,
                template: template(key),
            }
            .apply(&mut layout, &mut ids)
            .unwrap();
        }

        LayoutMutation::UpdateRowStyle {
            section_id: section_id.clone(),
            row_id,
            style: json!({ "padding": { "top": 12, "bottom": 12 }, "borderWidth": 2 })
                .as_object()
                .cloned()
                .unwrap(),
        }
        .apply(&mut layout, &mut ids)
        .unwrap();
    }

    let second = layout.sections[1].id.clone();
    LayoutMutation::DuplicateSection { section_id: second }
        .apply(&mut layout, &mut ids)
        .unwrap();

    (layout, ids)
}

#[test]
fn test_ids_are_pairwise_distinct() {
    let (layout, _) = build_busy_layout();
    let ids = layout.ids();
    let unique: HashSet<&str> = ids.iter().copied().collect();

    assert!(ids.len() > 50);
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_round_trip_after_edits() {
    let (layout, _) = build_busy_layout();

    let json = serialize(&layout).unwrap();
    let sections = parse(&json).unwrap();

    assert_eq!(sections, layout.sections);
}

#[test]
fn test_round_trip_keeps_normalized_styles() {
    let (layout, _) = build_busy_layout();
    let row = &layout.sections[0].rows[1];

    assert_eq!(row.style.padding.as_deref(), Some("12px 0 12px 0"));
    assert_eq!(row.style.border.as_deref(), Some("2px solid"));

    let sections = parse(&serialize(&layout).unwrap()).unwrap();
    assert_eq!(sections[0].rows[1].style, row.style);
}

#[test]
fn test_stale_address_after_delete() {
    let (mut layout, mut ids) = build_busy_layout();
    let (section_id, row_id, column_id) = first_column(&layout, 2);

    LayoutMutation::DeleteRow {
        section_id: section_id.clone(),
        row_id: row_id.clone(),
    }
    .apply(&mut layout, &mut ids)
    .unwrap();
    let before = layout.clone();

    let err = LayoutMutation::AddModuleToColumn {
        section_id: section_id.clone(),
        row_id: row_id.clone(),
        column_id,
        template: template("text"),
    }
    .apply(&mut layout, &mut ids)
    .unwrap_err();

    assert_eq!(err, MutationError::NotFound(Address::row(&section_id, &row_id)));
    assert_eq!(layout, before);
}

#[test]
fn test_duplicate_isolation_after_many_edits() {
    let (mut layout, mut ids) = build_busy_layout();
    let original = layout.sections[1].clone();
    let copy_id = layout.sections[2].id.clone();
    let row_id = layout.sections[2].rows[1].id.clone();

    LayoutMutation::ChangeRowLayout {
        section_id: copy_id.clone(),
        row_id: row_id.clone(),
        widths: vec![100.0],
    }
    .apply(&mut layout, &mut ids)
    .unwrap();
    LayoutMutation::UpdateRowSettings {
        section_id: copy_id.clone(),
        row_id,
        settings: json!({ "fullWidth": true }).as_object().cloned().unwrap(),
    }
    .apply(&mut layout, &mut ids)
    .unwrap();
    LayoutMutation::DeleteSection { section_id: copy_id }
        .apply(&mut layout, &mut ids)
        .unwrap();

    assert_eq!(layout.sections[1], original);
}

#[test]
fn test_starter_scenario() {
    let mut ids = IDGenerator::default();
    let mut layout = starter_layout(&mut ids);
    let header_before = layout.sections[0].clone();
    let section_id = layout.sections[1].id.clone();

    // Add a row to section 2; it holds a single full-width column
    let row_id = LayoutMutation::AddRowToSection {
        section_id: section_id.clone(),
    }
    .apply(&mut layout, &mut ids)
    .unwrap()
    .created_id
    .unwrap();
    let column_id = layout.sections[1].row(&row_id).unwrap().columns[0].id.clone();

    LayoutMutation::AddModuleToColumn {
        section_id: section_id.clone(),
        row_id: row_id.clone(),
        column_id: column_id.clone(),
        template: template("speakers"),
    }
    .apply(&mut layout, &mut ids)
    .unwrap();

    LayoutMutation::DuplicateSection {
        section_id: section_id.clone(),
    }
    .apply(&mut layout, &mut ids)
    .unwrap();

    assert_eq!(layout.sections.len(), 3);
    assert_eq!(layout.sections[0], header_before);

    let original = &layout.sections[1];
    let copy = &layout.sections[2];
    let original_row = original.row(&row_id).unwrap();
    let copy_row = &copy.rows[1];

    assert_ne!(copy.id, original.id);
    assert_ne!(copy_row.id, original_row.id);
    assert_ne!(copy_row.columns[0].id, column_id);
    assert_eq!(copy_row.columns[0].modules[0].name, "speakers");
    assert_ne!(copy_row.columns[0].modules[0].id, original_row.columns[0].modules[0].id);
}
