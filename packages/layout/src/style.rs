//! # Style descriptions
//!
//! Sections, rows and columns carry an opaque style record. Two on-disk
//! schemas exist:
//!
//! - **Legacy**: nested per-side spacing (`padding: {top, right, bottom, left}`)
//!   and discrete border/shadow fields (`borderWidth`, `borderColor`, `shadow: {..}`)
//! - **Current**: CSS-like shorthand strings (`padding: "8px 16px"`, `border: "1px solid #ddd"`)
//!
//! Both are detected by shape and normalized into a single [`Style`] as soon as
//! they are read. Nothing downstream branches on the schema.
//!
//! [`to_render_properties`] turns a [`Style`] into concrete CSS properties.

use crate::error::StyleError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Canonical style record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    /// 0.0 - 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// `top`, `center` or `bottom`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,

    /// Keys this record does not model, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Normalize a raw style description of either schema
    pub fn from_value(value: Value) -> Result<Self, StyleError> {
        Ok(StyleDocument::detect(value)?.normalize())
    }

    /// Shallow-merge a partial record into this style.
    ///
    /// Keys in `patch` replace keys in `self`; a `null` value removes the key.
    /// The merged record is normalized again, so a legacy-shaped patch is
    /// accepted as well.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Style, StyleError> {
        let mut base = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for (key, value) in patch {
            if value.is_null() {
                base.remove(key);
            } else {
                base.insert(key.clone(), value.clone());
            }
        }

        Style::from_value(Value::Object(base))
    }

    /// Inline CSS text for this style
    pub fn to_css(&self) -> String {
        render_properties_to_css(&to_render_properties(self))
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Style::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// A style description as found on disk, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum StyleDocument {
    Legacy(StyleV1),
    Current(StyleV2),
}

impl StyleDocument {
    /// Classify a raw style object by its shape
    pub fn detect(value: Value) -> Result<Self, StyleError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(StyleError::NotAnObject(json_kind(&other).to_string())),
        };

        let legacy = is_legacy_shape(&map);
        let value = Value::Object(map);

        if legacy {
            serde_json::from_value(value)
                .map(StyleDocument::Legacy)
                .map_err(invalid_field)
        } else {
            serde_json::from_value(value)
                .map(StyleDocument::Current)
                .map_err(invalid_field)
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StyleDocument::Legacy(_))
    }

    pub fn normalize(self) -> Style {
        match self {
            StyleDocument::Legacy(v1) => v1.into(),
            StyleDocument::Current(v2) => v2.into(),
        }
    }
}

fn is_legacy_shape(map: &Map<String, Value>) -> bool {
    let object_valued = |key: &str| map.get(key).map(Value::is_object).unwrap_or(false);

    object_valued("padding")
        || object_valued("margin")
        || object_valued("shadow")
        || map.contains_key("borderWidth")
        || map.contains_key("borderStyle")
}

fn invalid_field(e: serde_json::Error) -> StyleError {
    StyleError::InvalidField {
        field: "style".to_string(),
        message: e.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A CSS length given either as a bare number (pixels) or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Number(f64),
    Text(String),
}

impl Length {
    pub fn to_css(&self) -> String {
        match self {
            Length::Number(n) if *n == 0.0 => "0".to_string(),
            Length::Number(n) => format!("{}px", n),
            Length::Text(s) => s.trim().to_string(),
        }
    }
}

/// Legacy per-side spacing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub top: Option<Length>,
    pub right: Option<Length>,
    pub bottom: Option<Length>,
    pub left: Option<Length>,
}

impl Spacing {
    /// `"top right bottom left"`, missing sides become `0`
    pub fn to_shorthand(&self) -> String {
        let side = |l: &Option<Length>| l.as_ref().map(Length::to_css).unwrap_or_else(|| "0".to_string());
        format!(
            "{} {} {} {}",
            side(&self.top),
            side(&self.right),
            side(&self.bottom),
            side(&self.left)
        )
    }
}

/// Spacing in a legacy record. Records merged with a current-schema
/// record can carry a shorthand on one side and per-side spacing on the other.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpacingValue {
    Sides(Spacing),
    Shorthand(Length),
}

impl SpacingValue {
    pub fn to_css(&self) -> String {
        match self {
            SpacingValue::Sides(spacing) => spacing.to_shorthand(),
            SpacingValue::Shorthand(length) => length.to_css(),
        }
    }
}

/// Legacy shadow, either pre-formatted or as discrete parts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Shadow {
    Css(String),
    Parts {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        blur: f64,
        #[serde(default)]
        spread: f64,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        inset: bool,
    },
}

impl Shadow {
    pub fn to_css(&self) -> String {
        match self {
            Shadow::Css(s) => s.trim().to_string(),
            Shadow::Parts {
                x,
                y,
                blur,
                spread,
                color,
                inset,
            } => {
                let mut parts = Vec::new();
                if *inset {
                    parts.push("inset".to_string());
                }
                for n in [x, y, blur, spread] {
                    parts.push(Length::Number(*n).to_css());
                }
                if let Some(color) = color {
                    parts.push(color.clone());
                }
                parts.join(" ")
            }
        }
    }
}

/// Legacy schema: nested spacing, discrete border and shadow fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleV1 {
    pub padding: Option<SpacingValue>,
    pub margin: Option<SpacingValue>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
    pub background_size: Option<String>,
    pub background_position: Option<String>,
    pub border: Option<String>,
    pub border_top: Option<String>,
    pub border_right: Option<String>,
    pub border_bottom: Option<String>,
    pub border_left: Option<String>,
    pub border_width: Option<Length>,
    pub border_style: Option<String>,
    pub border_color: Option<String>,
    pub border_radius: Option<Length>,
    pub shadow: Option<Shadow>,
    pub box_shadow: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
    pub text_align: Option<String>,
    pub vertical_align: Option<String>,
    pub color: Option<String>,
    pub min_height: Option<Length>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<StyleV1> for Style {
    fn from(v1: StyleV1) -> Self {
        // A lone `borderColor` next to a `border` shorthand is an opaque key, not a discrete border
        let has_discrete_border = v1.border_width.is_some()
            || v1.border_style.is_some()
            || (v1.border_color.is_some() && v1.border.is_none());
        let discrete_border = if has_discrete_border {
            let width = v1
                .border_width
                .as_ref()
                .map(Length::to_css)
                .unwrap_or_else(|| "1px".to_string());
            let style = v1.border_style.clone().unwrap_or_else(|| "solid".to_string());
            let mut border = format!("{} {}", width, style);
            if let Some(color) = &v1.border_color {
                border.push(' ');
                border.push_str(color);
            }
            Some(border)
        } else {
            None
        };

        let mut extra = v1.extra;
        if !has_discrete_border {
            if let Some(color) = v1.border_color {
                extra.insert("borderColor".to_string(), Value::String(color));
            }
        }

        Style {
            padding: v1.padding.as_ref().map(SpacingValue::to_css),
            margin: v1.margin.as_ref().map(SpacingValue::to_css),
            background_color: v1.background_color,
            background_image: v1.background_image,
            background_size: v1.background_size,
            background_position: v1.background_position,
            border: discrete_border.or(v1.border),
            border_top: v1.border_top,
            border_right: v1.border_right,
            border_bottom: v1.border_bottom,
            border_left: v1.border_left,
            border_radius: v1.border_radius.as_ref().map(Length::to_css),
            box_shadow: v1.shadow.as_ref().map(Shadow::to_css).or(v1.box_shadow),
            opacity: v1.opacity,
            text_align: v1.text_align,
            vertical_align: v1.vertical_align,
            color: v1.color,
            min_height: v1.min_height.as_ref().map(Length::to_css),
            extra,
        }
    }
}

/// Current schema: shorthand strings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleV2 {
    pub padding: Option<Length>,
    pub margin: Option<Length>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
    pub background_size: Option<String>,
    pub background_position: Option<String>,
    pub border: Option<String>,
    pub border_top: Option<String>,
    pub border_right: Option<String>,
    pub border_bottom: Option<String>,
    pub border_left: Option<String>,
    pub border_radius: Option<Length>,
    pub box_shadow: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub opacity: Option<f64>,
    pub text_align: Option<String>,
    pub vertical_align: Option<String>,
    pub color: Option<String>,
    pub min_height: Option<Length>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<StyleV2> for Style {
    fn from(v2: StyleV2) -> Self {
        Style {
            padding: v2.padding.as_ref().map(Length::to_css),
            margin: v2.margin.as_ref().map(Length::to_css),
            background_color: v2.background_color,
            background_image: v2.background_image,
            background_size: v2.background_size,
            background_position: v2.background_position,
            border: v2.border,
            border_top: v2.border_top,
            border_right: v2.border_right,
            border_bottom: v2.border_bottom,
            border_left: v2.border_left,
            border_radius: v2.border_radius.as_ref().map(Length::to_css),
            box_shadow: v2.box_shadow,
            opacity: v2.opacity,
            text_align: v2.text_align,
            vertical_align: v2.vertical_align,
            color: v2.color,
            min_height: v2.min_height.as_ref().map(Length::to_css),
            extra: v2.extra,
        }
    }
}

/// Accepts `0.5`, `"0.5"` or `null`
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, found {:?}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, found {}",
            json_kind(&other)
        ))),
    }
}

/// Convert a style record into concrete CSS properties.
///
/// Unset fields are omitted. The result only depends on the input, so
/// translating the same style twice yields the same map.
pub fn to_render_properties(style: &Style) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();

    // Pass-through keys first so modelled fields win on conflict
    for (key, value) in &style.extra {
        let rendered = match value {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        props.insert(kebab_case(key), rendered);
    }

    let mut set = |name: &str, value: &Option<String>| {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            props.insert(name.to_string(), value.to_string());
        }
    };

    set("padding", &style.padding);
    set("margin", &style.margin);
    set("background-color", &style.background_color);
    set("background-image", &style.background_image.as_deref().map(css_image));
    set("background-size", &style.background_size);
    set("background-position", &style.background_position);
    set("border", &style.border);
    set("border-top", &style.border_top);
    set("border-right", &style.border_right);
    set("border-bottom", &style.border_bottom);
    set("border-left", &style.border_left);
    set("border-radius", &style.border_radius);
    set("box-shadow", &style.box_shadow);
    set("opacity", &style.opacity.map(|o| o.clamp(0.0, 1.0).to_string()));
    set("text-align", &style.text_align);
    set("color", &style.color);
    set("min-height", &style.min_height);

    if let Some(justify) = style.vertical_align.as_deref().and_then(vertical_justify) {
        props.insert("display".to_string(), "flex".to_string());
        props.insert("flex-direction".to_string(), "column".to_string());
        props.insert("justify-content".to_string(), justify.to_string());
    }

    props
}

/// `prop: value; prop: value;`
pub fn render_properties_to_css(props: &BTreeMap<String, String>) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn css_image(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.contains('(') {
        value.to_string()
    } else {
        format!("url(\"{}\")", value.replace('"', "%22"))
    }
}

fn vertical_justify(value: &str) -> Option<&'static str> {
    match value.trim() {
        "top" | "start" => Some("flex-start"),
        "center" | "middle" => Some("center"),
        "bottom" | "end" => Some("flex-end"),
        _ => None,
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
