//! # Layout documents
//!
//! A layout is persisted as JSON in one of two shapes:
//!
//! ```text
//! [ Section, Section, ... ]                                  // legacy
//! { "sections": [ Section, ... ], "meta": { "version": 2 } } // current
//! ```
//!
//! [`serialize`] always writes the current shape. [`parse`] accepts both and
//! yields the same sections for either.

use crate::error::{ParseError, ParseResult};
use crate::id_generator::IDGenerator;
use crate::model::{Layout, Section};
use crate::starter::starter_layout;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Version written into `meta.version`
pub const LAYOUT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMeta {
    pub version: u32,
}

/// Current on-disk document shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LayoutMeta>,
}

/// Serializer converts a layout into its persisted JSON document
pub struct Serializer {
    pretty: bool,
    include_meta: bool,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            pretty: false,
            include_meta: true,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn include_meta(mut self, include_meta: bool) -> Self {
        self.include_meta = include_meta;
        self
    }

    pub fn serialize(&self, layout: &Layout) -> ParseResult<String> {
        let document = LayoutDocumentRef {
            sections: &layout.sections,
            meta: self.include_meta.then_some(LayoutMeta {
                version: LAYOUT_VERSION,
            }),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };

        json.map_err(|e| ParseError::Encode(e.to_string()))
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct LayoutDocumentRef<'a> {
    sections: &'a [Section],
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<LayoutMeta>,
}

/// Serialize a layout to the canonical `{ sections, meta }` document
pub fn serialize(layout: &Layout) -> ParseResult<String> {
    Serializer::new().serialize(layout)
}

/// Parse a layout document of either shape
pub fn parse(source: &str) -> ParseResult<Vec<Section>> {
    let value: Value = serde_json::from_str(source)?;
    parse_value(value)
}

/// Parse an already decoded JSON value of either shape
pub fn parse_value(value: Value) -> ParseResult<Vec<Section>> {
    let sections = match value {
        Value::Array(sections) => sections,
        Value::Object(mut map) => match map.remove("sections") {
            Some(Value::Array(sections)) => {
                if let Some(version) = map
                    .get("meta")
                    .and_then(|meta| meta.get("version"))
                    .and_then(Value::as_u64)
                {
                    if version > u64::from(LAYOUT_VERSION) {
                        tracing::warn!(
                            "Layout document version {} is newer than {}, reading known fields only",
                            version,
                            LAYOUT_VERSION
                        );
                    }
                }
                sections
            }
            Some(other) => {
                return Err(ParseError::unsupported_shape(format!(
                    "`sections` of type {}",
                    value_kind(&other)
                )))
            }
            None => return Err(ParseError::unsupported_shape("object without `sections`")),
        },
        other => return Err(ParseError::unsupported_shape(value_kind(&other))),
    };

    sections
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            serde_json::from_value(section)
                .map_err(|e| ParseError::invalid_node("section", index, e.to_string()))
        })
        .collect()
}

/// Parse a layout, falling back to the starter layout when the document is
/// unreadable. The failure is logged, never propagated.
pub fn parse_or_starter(source: &str, ids: &mut IDGenerator) -> Layout {
    match parse(source) {
        Ok(sections) => {
            let layout = Layout::new(sections);
            ids.observe(&layout);
            layout
        }
        Err(e) => {
            tracing::warn!("Falling back to starter layout: {}", e);
            starter_layout(ids)
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Content references are stored as strings, older documents used numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            value_kind(&other)
        ))),
    }
}
