//! # Drag and drop reordering
//!
//! ```text
//! Idle ──start(active, scope)──▶ Dragging ──drop(over) / cancel()──▶ Idle
//! ```
//!
//! A drag is confined to one sibling list: the sections of the layout, the
//! rows of one section, or the modules of one column. Dropping on a target
//! outside that list, on nothing, or on the dragged node itself does nothing.

use crate::mutations::LayoutMutation;
use pagesmith_layout::Layout;
use serde::{Deserialize, Serialize};

/// Sibling list a drag is confined to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum DragScope {
    Sections,
    Rows {
        section_id: String,
    },
    Modules {
        section_id: String,
        row_id: String,
        column_id: String,
    },
}

impl DragScope {
    /// Ids of the siblings in this scope, or `None` if the scope no longer resolves
    pub fn sibling_ids<'a>(&self, layout: &'a Layout) -> Option<Vec<&'a str>> {
        match self {
            DragScope::Sections => Some(layout.sections.iter().map(|s| s.id.as_str()).collect()),
            DragScope::Rows { section_id } => {
                let section = layout.section(section_id)?;
                Some(section.rows.iter().map(|r| r.id.as_str()).collect())
            }
            DragScope::Modules {
                section_id,
                row_id,
                column_id,
            } => {
                let column = layout.column(section_id, row_id, column_id)?;
                Some(column.modules.iter().map(|m| m.id.as_str()).collect())
            }
        }
    }

    /// Mutation that moves the sibling at `from` to `to`
    pub fn move_mutation(&self, from: usize, to: usize) -> LayoutMutation {
        match self {
            DragScope::Sections => LayoutMutation::MoveSection { from, to },
            DragScope::Rows { section_id } => LayoutMutation::MoveRow {
                section_id: section_id.clone(),
                from,
                to,
            },
            DragScope::Modules {
                section_id,
                row_id,
                column_id,
            } => LayoutMutation::ReorderModulesInColumn {
                section_id: section_id.clone(),
                row_id: row_id.clone(),
                column_id: column_id.clone(),
                from,
                to,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active_id: String,
        scope: DragScope,
    },
}

/// Tracks the single active drag session
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging `active_id`; replaces any session already in progress
    pub fn start(&mut self, active_id: impl Into<String>, scope: DragScope) {
        let active_id = active_id.into();
        tracing::debug!("Drag started: {} in {:?}", active_id, scope);
        self.state = DragState::Dragging { active_id, scope };
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { active_id, .. } => Some(active_id),
            DragState::Idle => None,
        }
    }

    /// Finish the drag over `over_id`.
    ///
    /// Always returns to idle. Yields the reorder mutation to apply, if any.
    pub fn drop(&mut self, over_id: Option<&str>, layout: &Layout) -> Option<LayoutMutation> {
        let (active_id, scope) = match std::mem::take(&mut self.state) {
            DragState::Dragging { active_id, scope } => (active_id, scope),
            DragState::Idle => return None,
        };

        let over_id = over_id?;
        let siblings = scope.sibling_ids(layout)?;
        let (from, to) = compute_move(&siblings, &active_id, over_id)?;

        tracing::debug!("Drop {} over {}: {} -> {}", active_id, over_id, from, to);
        Some(scope.move_mutation(from, to))
    }
}

/// Position lookup for a drop: `(active index, over index)`.
///
/// `None` when either id is not in `order` or both are the same node.
pub fn compute_move<S: AsRef<str>>(order: &[S], active_id: &str, over_id: &str) -> Option<(usize, usize)> {
    if active_id == over_id {
        return None;
    }
    let from = order.iter().position(|id| id.as_ref() == active_id)?;
    let to = order.iter().position(|id| id.as_ref() == over_id)?;
    Some((from, to))
}

/// New sibling order after dropping `active_id` over `over_id`.
///
/// `None` when the drop is a no-op.
pub fn reordered<S: AsRef<str> + Clone>(order: &[S], active_id: &str, over_id: &str) -> Option<Vec<S>> {
    let (from, to) = compute_move(order, active_id, over_id)?;
    let mut next = order.to_vec();
    array_move(&mut next, from, to);
    Some(next)
}

/// Order-preserving move: remove at `from`, reinsert at `to`.
///
/// Returns `false` and leaves `items` untouched when an index is out of range.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_layout::{starter_layout, IDGenerator};

    #[test]
    fn test_array_move_forward() {
        let mut items = vec!["A", "B", "C", "D"];
        assert!(array_move(&mut items, 0, 2));
        assert_eq!(items, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_array_move_backward() {
        let mut items = vec!["A", "B", "C", "D"];
        assert!(array_move(&mut items, 3, 1));
        assert_eq!(items, vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_array_move_out_of_range() {
        let mut items = vec![1, 2, 3];
        assert!(!array_move(&mut items, 0, 3));
        assert!(!array_move(&mut items, 5, 0));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_compute_move() {
        let order = ["a", "b", "c"];
        assert_eq!(compute_move(&order, "a", "c"), Some((0, 2)));
        assert_eq!(compute_move(&order, "b", "b"), None);
        assert_eq!(compute_move(&order, "a", "z"), None);
    }

    #[test]
    fn test_reordered_is_permutation() {
        let order = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
        let next = reordered(&order, "A", "C").unwrap();
        assert_eq!(next, vec!["B", "C", "A", "D"]);
        assert!(reordered(&order, "A", "A").is_none());
    }

    #[test]
    fn test_drop_on_section_yields_move() {
        let mut ids = IDGenerator::new(0);
        let layout = starter_layout(&mut ids);
        let first = layout.sections[0].id.clone();
        let second = layout.sections[1].id.clone();

        let mut drag = DragController::new();
        drag.start(first, DragScope::Sections);
        assert!(drag.is_dragging());

        let mutation = drag.drop(Some(&second), &layout);
        assert_eq!(mutation, Some(LayoutMutation::MoveSection { from: 0, to: 1 }));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drop_outside_scope_is_noop() {
        let mut ids = IDGenerator::new(0);
        let layout = starter_layout(&mut ids);
        let section_id = layout.sections[0].id.clone();
        let row_id = layout.sections[0].rows[0].id.clone();
        let other_section = layout.sections[1].id.clone();

        let mut drag = DragController::new();
        drag.start(row_id, DragScope::Rows { section_id });
        assert_eq!(drag.drop(Some(&other_section), &layout), None);
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_drop_without_target_or_session() {
        let mut ids = IDGenerator::new(0);
        let layout = starter_layout(&mut ids);

        let mut drag = DragController::new();
        assert_eq!(drag.drop(Some("anything"), &layout), None);

        drag.start(layout.sections[0].id.clone(), DragScope::Sections);
        assert_eq!(drag.drop(None, &layout), None);
        assert_eq!(drag.active_id(), None);
    }
}
