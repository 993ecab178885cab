use pagesmith_layout::DEFAULT_ID_BASELINE;
use std::time::Duration;

/// Tunables for a [`crate::PageBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// First counter value handed out by the id generator
    pub id_baseline: u64,
    /// How long a save confirmation stays visible
    pub success_notice: Duration,
    /// How long a save error stays visible
    pub error_notice: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id_baseline: DEFAULT_ID_BASELINE,
            success_notice: Duration::from_millis(3000),
            error_notice: Duration::from_millis(5000),
        }
    }
}
