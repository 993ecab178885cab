use crate::id_generator::{IDGenerator, COLUMN_PREFIX, MODULE_PREFIX, ROW_PREFIX, SECTION_PREFIX};
use crate::model::{Column, Layout, Module, Row, Section, SectionKind};
use serde_json::{json, Map, Value};

/// Layout given to a brand-new page: a header section and a content section
pub fn starter_layout(ids: &mut IDGenerator) -> Layout {
    let mut header = blank_section(ids, "Header", SectionKind::Header);
    header.style.padding = Some("48px 24px".to_string());
    header.style.text_align = Some("center".to_string());
    if let Some(column) = header.rows.first_mut().and_then(|r| r.columns.first_mut()) {
        column.modules.push(Module {
            id: ids.new_id(MODULE_PREFIX),
            name: "heading".to_string(),
            category: "basic".to_string(),
            default_props: props(json!({ "text": "Page title", "level": 1 })),
            block_id: None,
            icon: Some("heading".to_string()),
        });
    }

    let mut content = blank_section(ids, "Main Content", SectionKind::Content);
    content.style.padding = Some("32px 24px".to_string());

    Layout::new(vec![header, content])
}

/// A section holding one row with a single full-width column
pub fn blank_section(ids: &mut IDGenerator, name: &str, kind: SectionKind) -> Section {
    let mut section = Section::new(ids.new_id(SECTION_PREFIX), name, kind);
    section.rows.push(blank_row(ids));
    section
}

/// A row with a single full-width column
pub fn blank_row(ids: &mut IDGenerator) -> Row {
    let mut row = Row::new(ids.new_id(ROW_PREFIX));
    row.columns.push(Column::new(ids.new_id(COLUMN_PREFIX), 100.0));
    row
}

fn props(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_has_header_and_content() {
        let mut ids = IDGenerator::new(0);
        let layout = starter_layout(&mut ids);

        assert_eq!(layout.sections.len(), 2);
        assert_eq!(layout.sections[0].kind, SectionKind::Header);
        assert_eq!(layout.sections[1].kind, SectionKind::Content);
        for section in &layout.sections {
            assert_eq!(section.rows.len(), 1);
            assert_eq!(section.rows[0].widths(), vec![100.0]);
        }
        assert_eq!(layout.module_count(), 1);
    }
}
