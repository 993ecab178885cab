//! # Pagesmith Layout
//!
//! The page layout tree and its persisted document form.
//!
//! ```text
//! Layout
//!  └─ Section (header | footer | content | custom)
//!      └─ Row (settings, column widths ~ 100%)
//!          └─ Column (width %)
//!              └─ Module (leaf: type name + default props)
//! ```
//!
//! Sections, rows and columns carry a [`Style`] record, normalized from
//! either the legacy or the current schema on load.

pub mod error;
pub mod id_generator;
pub mod model;
pub mod presets;
pub mod serializer;
pub mod starter;
pub mod style;

pub use error::{ParseError, ParseResult, StyleError};
pub use id_generator::{IDGenerator, DEFAULT_ID_BASELINE};
pub use model::{Address, Column, Layout, Module, Row, Section, SectionKind};
pub use presets::{preset_by_name, preset_name, LayoutPreset, CUSTOM_LAYOUT, PRESETS};
pub use serializer::{parse, parse_or_starter, parse_value, serialize, LayoutDocument, Serializer, LAYOUT_VERSION};
pub use starter::{blank_row, blank_section, starter_layout};
pub use style::{render_properties_to_css, to_render_properties, Style, StyleDocument};
