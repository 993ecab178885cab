use crate::style::Style;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Informational tag on a section. Does not constrain behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Header,
    Footer,
    #[default]
    Content,
    Custom,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Footer => "footer",
            SectionKind::Content => "content",
            SectionKind::Custom => "custom",
        }
    }
}

impl From<String> for SectionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "header" => SectionKind::Header,
            "footer" => SectionKind::Footer,
            "content" | "" => SectionKind::Content,
            _ => SectionKind::Custom,
        }
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered sequence of sections, stacked vertically
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SectionRepr")]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(rename = "styling", skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RowRepr")]
pub struct Row {
    pub id: String,
    #[serde(rename = "styling", skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    /// Free-form renderer settings, never interpreted here
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnRepr")]
pub struct Column {
    pub id: String,
    /// Percentage of the row width
    pub width: f64,
    #[serde(rename = "styling", skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    pub modules: Vec<Module>,
}

/// Leaf content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    /// Module type name, used by the renderer to pick a view
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub default_props: Map<String, Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serializer::string_or_number"
    )]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

// Input shapes. Both `style` and `styling` are accepted; `styling` wins
// key by key when a node carries both.

#[derive(Deserialize)]
struct SectionRepr {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: SectionKind,
    #[serde(default)]
    style: Option<Style>,
    #[serde(default)]
    styling: Option<Style>,
    #[serde(default)]
    rows: Vec<Row>,
}

impl From<SectionRepr> for Section {
    fn from(repr: SectionRepr) -> Self {
        Section {
            id: repr.id,
            name: repr.name,
            kind: repr.kind,
            style: combine_styles(repr.style, repr.styling),
            rows: repr.rows,
        }
    }
}

#[derive(Deserialize)]
struct RowRepr {
    id: String,
    #[serde(default)]
    style: Option<Style>,
    #[serde(default)]
    styling: Option<Style>,
    #[serde(default)]
    settings: Option<Map<String, Value>>,
    #[serde(default)]
    columns: Vec<Column>,
}

impl From<RowRepr> for Row {
    fn from(repr: RowRepr) -> Self {
        Row {
            id: repr.id,
            style: combine_styles(repr.style, repr.styling),
            settings: repr.settings.unwrap_or_default(),
            columns: repr.columns,
        }
    }
}

#[derive(Deserialize)]
struct ColumnRepr {
    id: String,
    #[serde(default = "full_width")]
    width: f64,
    #[serde(default)]
    style: Option<Style>,
    #[serde(default)]
    styling: Option<Style>,
    #[serde(default)]
    modules: Vec<Module>,
}

impl From<ColumnRepr> for Column {
    fn from(repr: ColumnRepr) -> Self {
        Column {
            id: repr.id,
            width: repr.width,
            style: combine_styles(repr.style, repr.styling),
            modules: repr.modules,
        }
    }
}

fn full_width() -> f64 {
    100.0
}

fn combine_styles(style: Option<Style>, styling: Option<Style>) -> Style {
    match (style, styling) {
        (None, None) => Style::default(),
        (Some(s), None) | (None, Some(s)) => s,
        (Some(base), Some(overlay)) => {
            let patch = match serde_json::to_value(&overlay) {
                Ok(Value::Object(map)) => map,
                _ => return overlay,
            };
            base.merged(&patch).unwrap_or(overlay)
        }
    }
}

impl Section {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            style: Style::default(),
            rows: Vec::new(),
        }
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn row_mut(&mut self, row_id: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == row_id)
    }

    pub fn row_index(&self, row_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == row_id)
    }
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            style: Style::default(),
            settings: Map::new(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn widths(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.width).collect()
    }
}

impl Column {
    pub fn new(id: impl Into<String>, width: f64) -> Self {
        Self {
            id: id.into(),
            width,
            style: Style::default(),
            modules: Vec::new(),
        }
    }
}

impl Layout {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    pub fn column(&self, section_id: &str, row_id: &str, column_id: &str) -> Option<&Column> {
        self.section(section_id)?.row(row_id)?.column(column_id)
    }

    /// Whether the section may be offered for deletion (more than one section exists)
    pub fn can_delete_section(&self) -> bool {
        self.sections.len() > 1
    }

    /// Every node id in document order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for section in &self.sections {
            ids.push(section.id.as_str());
            for row in &section.rows {
                ids.push(row.id.as_str());
                for column in &row.columns {
                    ids.push(column.id.as_str());
                    for module in &column.modules {
                        ids.push(module.id.as_str());
                    }
                }
            }
        }
        ids
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .flat_map(|r| r.columns.iter())
            .flat_map(|c| c.modules.iter())
    }

    pub fn module_count(&self) -> usize {
        self.modules().count()
    }
}

impl From<Vec<Section>> for Layout {
    fn from(sections: Vec<Section>) -> Self {
        Self { sections }
    }
}

/// Location of a node in the tree, used to report unresolved targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum Address {
    Section {
        section_id: String,
    },
    Row {
        section_id: String,
        row_id: String,
    },
    Column {
        section_id: String,
        row_id: String,
        column_id: String,
    },
}

impl Address {
    pub fn section(section_id: &str) -> Self {
        Address::Section {
            section_id: section_id.to_string(),
        }
    }

    pub fn row(section_id: &str, row_id: &str) -> Self {
        Address::Row {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
        }
    }

    pub fn column(section_id: &str, row_id: &str, column_id: &str) -> Self {
        Address::Column {
            section_id: section_id.to_string(),
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Section { section_id } => write!(f, "section {}", section_id),
            Address::Row { section_id, row_id } => write!(f, "row {} in section {}", row_id, section_id),
            Address::Column {
                section_id,
                row_id,
                column_id,
            } => write!(
                f,
                "column {} in row {} of section {}",
                column_id, row_id, section_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_defaults_when_fields_missing() {
        let section: Section = serde_json::from_value(json!({ "id": "s1", "rows": [] })).unwrap();
        assert_eq!(section.name, "");
        assert_eq!(section.kind, SectionKind::Content);
        assert!(section.style.is_empty());
    }

    #[test]
    fn test_unknown_kind_becomes_custom() {
        let section: Section = serde_json::from_value(json!({ "id": "s1", "type": "hero" })).unwrap();
        assert_eq!(section.kind, SectionKind::Custom);
    }

    #[test]
    fn test_styling_overrides_style_per_key() {
        let row: Row = serde_json::from_value(json!({
            "id": "r1",
            "style": { "padding": { "top": 8, "right": 8, "bottom": 8, "left": 8 }, "color": "red" },
            "styling": { "color": "blue" },
            "columns": []
        }))
        .unwrap();

        assert_eq!(row.style.padding.as_deref(), Some("8px 8px 8px 8px"));
        assert_eq!(row.style.color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_style_serializes_under_styling() {
        let mut column = Column::new("c1", 50.0);
        column.style.color = Some("red".to_string());
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["styling"]["color"], "red");
        assert!(json.get("style").is_none());

        let bare = serde_json::to_value(Column::new("c2", 50.0)).unwrap();
        assert!(bare.get("styling").is_none());
    }

    #[test]
    fn test_ids_in_document_order() {
        let mut column = Column::new("c1", 100.0);
        column.modules.push(Module {
            id: "m1".to_string(),
            name: "text".to_string(),
            category: "basic".to_string(),
            default_props: Map::new(),
            block_id: None,
            icon: None,
        });
        let mut row = Row::new("r1");
        row.columns.push(column);
        let mut section = Section::new("s1", "Main", SectionKind::Content);
        section.rows.push(row);

        let layout = Layout::new(vec![section]);
        assert_eq!(layout.ids(), vec!["s1", "r1", "c1", "m1"]);
        assert!(!layout.can_delete_section());
    }

    #[test]
    fn test_address_display() {
        let addr = Address::column("s1", "r1", "c9");
        assert_eq!(addr.to_string(), "column c9 in row r1 of section s1");
    }
}
