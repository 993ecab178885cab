//! Named column-width presets for rows

/// Label used when a row's widths match no preset
pub const CUSTOM_LAYOUT: &str = "Custom";

/// Widths may differ from a preset by this much and still match
const WIDTH_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPreset {
    pub name: &'static str,
    pub widths: &'static [f64],
}

pub const PRESETS: &[LayoutPreset] = &[
    LayoutPreset { name: "1 Column", widths: &[100.0] },
    LayoutPreset { name: "2 Columns", widths: &[50.0, 50.0] },
    LayoutPreset { name: "3 Columns", widths: &[33.33, 33.33, 33.34] },
    LayoutPreset { name: "4 Columns", widths: &[25.0, 25.0, 25.0, 25.0] },
    LayoutPreset { name: "1/3 + 2/3", widths: &[33.33, 66.67] },
    LayoutPreset { name: "2/3 + 1/3", widths: &[66.67, 33.33] },
    LayoutPreset { name: "1/4 + 3/4", widths: &[25.0, 75.0] },
    LayoutPreset { name: "3/4 + 1/4", widths: &[75.0, 25.0] },
];

/// Name of the preset matching `widths`, or [`CUSTOM_LAYOUT`]
pub fn preset_name(widths: &[f64]) -> &'static str {
    PRESETS
        .iter()
        .find(|preset| {
            preset.widths.len() == widths.len()
                && preset
                    .widths
                    .iter()
                    .zip(widths)
                    .all(|(expected, actual)| (expected - actual).abs() <= WIDTH_TOLERANCE)
        })
        .map(|preset| preset.name)
        .unwrap_or(CUSTOM_LAYOUT)
}

pub fn preset_by_name(name: &str) -> Option<&'static LayoutPreset> {
    PRESETS.iter().find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
}
