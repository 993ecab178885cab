use crate::model::Layout;

/// Baseline counter for a fresh session. Ids minted in a session start above
/// this value so they do not collide with hand-written or seeded ids.
pub const DEFAULT_ID_BASELINE: u64 = 1000;

/// Persisted suffixes above this value are not observed, leaving the counter
/// room to grow without overflowing.
pub const MAX_OBSERVED_ID: u64 = u64::MAX / 2;

pub const SECTION_PREFIX: &str = "section";
pub const ROW_PREFIX: &str = "row";
pub const COLUMN_PREFIX: &str = "col";
pub const MODULE_PREFIX: &str = "module";

/// Sequential ID generator for layout nodes within an editing session.
///
/// One counter is shared by every prefix, so `section-1001` and `row-1001`
/// can never both exist.
#[derive(Debug, Clone)]
pub struct IDGenerator {
    count: u64,
}

impl IDGenerator {
    pub fn new(baseline: u64) -> Self {
        Self { count: baseline }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self, prefix: &str) -> String {
        self.count = self.count.saturating_add(1);
        format!("{}-{}", prefix, self.count)
    }

    /// Raise the counter above every numeric id suffix in `layout`.
    ///
    /// Suffixes above [`MAX_OBSERVED_ID`] are skipped; the counter stays far
    /// below them, so they cannot be minted again.
    pub fn observe(&mut self, layout: &Layout) {
        for id in layout.ids() {
            match numeric_suffix(id) {
                Some(n) if n > MAX_OBSERVED_ID => {
                    tracing::warn!("Not observing id {}: suffix leaves no room for new ids", id);
                }
                Some(n) => self.count = self.count.max(n),
                None => {}
            }
        }
    }

    /// Last value handed out (or the baseline)
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Default for IDGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_BASELINE)
    }
}

fn numeric_suffix(id: &str) -> Option<u64> {
    let (_, suffix) = id.rsplit_once('-')?;
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Row, Section, SectionKind};
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IDGenerator::new(10);

        assert_eq!(gen.new_id(SECTION_PREFIX), "section-11");
        assert_eq!(gen.new_id(ROW_PREFIX), "row-12");
        assert_eq!(gen.new_id(COLUMN_PREFIX), "col-13");
        assert_eq!(gen.count(), 13);
    }

    #[test]
    fn test_ids_are_unique_across_prefixes() {
        let mut gen = IDGenerator::default();
        let prefixes = [SECTION_PREFIX, ROW_PREFIX, COLUMN_PREFIX, MODULE_PREFIX];

        let ids: HashSet<String> = (0..400).map(|i| gen.new_id(prefixes[i % 4])).collect();
        assert_eq!(ids.len(), 400);
    }

    #[test]
    fn test_observe_skips_persisted_ids() {
        let mut row = Row::new("row-5000");
        row.columns.push(Column::new("col-legacy", 100.0));
        let mut section = Section::new("section-4999", "Main", SectionKind::Content);
        section.rows.push(row);
        let layout = Layout::new(vec![section]);

        let mut gen = IDGenerator::default();
        gen.observe(&layout);

        assert_eq!(gen.new_id(MODULE_PREFIX), "module-5001");
    }

    #[test]
    fn test_observe_skips_huge_suffixes() {
        let layout = Layout::new(vec![
            Section::new(format!("section-{}", u64::MAX), "Main", SectionKind::Content),
            Section::new("section-2000", "Other", SectionKind::Content),
        ]);

        let mut gen = IDGenerator::default();
        gen.observe(&layout);

        assert_eq!(gen.new_id(ROW_PREFIX), "row-2001");
        assert_eq!(gen.new_id(ROW_PREFIX), "row-2002");
    }

    #[test]
    fn test_new_id_near_the_ceiling_does_not_panic() {
        let mut gen = IDGenerator::new(u64::MAX - 1);
        assert_eq!(gen.new_id(ROW_PREFIX), format!("row-{}", u64::MAX));
        assert_eq!(gen.count(), u64::MAX);
    }

    #[test]
    fn test_observe_never_lowers_counter() {
        let layout = Layout::new(vec![Section::new("section-3", "Main", SectionKind::Content)]);
        let mut gen = IDGenerator::new(50);
        gen.observe(&layout);
        assert_eq!(gen.count(), 50);
    }
}
