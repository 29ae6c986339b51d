//! Keeps the selected row pinned across result-set refreshes.
//!
//! Re-pinning is identifier-first: when the sequence is replaced, the
//! previously selected slab index is searched for in the new sequence so the
//! selection stays on the same file while a query is refined. Positional
//! clamping is the fallback when the item disappeared entirely.

use crate::types::{ResultSequence, SlabIndex};

/// The current selection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Pinned {
        position: usize,
        identifier: Option<SlabIndex>,
        path: Option<String>,
    },
}

impl Selection {
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Unselected => None,
            Self::Pinned { position, .. } => Some(*position),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Pinned { path, .. } => path.as_deref(),
        }
    }
}

/// Owns the selection and reconciles it against sequence changes.
///
/// All methods return whether the observable selection changed, so the
/// caller can skip redundant re-renders.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Selection,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    /// Pins the selection at a position of the current sequence.
    ///
    /// Out-of-range picks are ignored. Re-picking the identical
    /// (position, identifier, path) triple is a no-op.
    pub fn pick(
        &mut self,
        position: usize,
        results: &ResultSequence,
        path: Option<String>,
    ) -> bool {
        if position >= results.len() {
            return false;
        }
        let next = Selection::Pinned {
            position,
            identifier: results[position],
            path,
        };
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }

    /// Clears the selection. Safe to call when already unselected.
    pub fn clear(&mut self) -> bool {
        if self.current == Selection::Unselected {
            return false;
        }
        self.current = Selection::Unselected;
        true
    }

    /// Re-resolves the pinned row after the result sequence was replaced.
    ///
    /// An empty sequence unpins. Otherwise the pinned identifier is searched
    /// for in the new sequence; if absent, the previous position is clamped
    /// into bounds. `resolve_path` looks up the hydrated path for the new
    /// position; when it has nothing yet, the previous path is kept only if
    /// the position did not move (same logical item), else left unknown
    /// until hydration.
    pub fn reconcile<F>(&mut self, results: &ResultSequence, resolve_path: F) -> bool
    where
        F: Fn(usize) -> Option<String>,
    {
        if results.is_empty() {
            return self.clear();
        }

        let Selection::Pinned {
            position,
            identifier,
            path,
        } = &self.current
        else {
            return false;
        };
        let (position, identifier) = (*position, *identifier);

        let next_position = identifier
            .and_then(|pinned| {
                results
                    .iter()
                    .position(|candidate| *candidate == Some(pinned))
            })
            .unwrap_or_else(|| position.min(results.len() - 1));
        let next_identifier = results[next_position];

        if next_position == position && next_identifier == identifier {
            return false;
        }

        let next_path = resolve_path(next_position).or_else(|| {
            if next_position == position {
                path.clone()
            } else {
                None
            }
        });
        self.current = Selection::Pinned {
            position: next_position,
            identifier: next_identifier,
            path: next_path,
        };
        true
    }

    /// Patches in a freshly hydrated path for the pinned position.
    ///
    /// Applied only when the selection is still pinned at that position with
    /// a different path; a late resolution for a superseded pick is dropped.
    pub fn patch_path(&mut self, position: usize, resolved: String) -> bool {
        match &mut self.current {
            Selection::Pinned {
                position: pinned,
                path,
                ..
            } if *pinned == position && path.as_deref() != Some(resolved.as_str()) => {
                *path = Some(resolved);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(value: u64) -> SlabIndex {
        SlabIndex::from_raw(value).expect("valid slab index")
    }

    fn sequence(values: &[Option<u64>]) -> ResultSequence {
        values.iter().map(|value| value.map(slab)).collect()
    }

    #[test]
    fn pick_pins_and_deduplicates() {
        let results = sequence(&[Some(1), Some(2)]);
        let mut tracker = SelectionTracker::new();

        assert!(tracker.pick(1, &results, Some("/b".to_string())));
        assert_eq!(tracker.current().position(), Some(1));
        assert_eq!(tracker.current().path(), Some("/b"));

        // Identical pick is a no-op.
        assert!(!tracker.pick(1, &results, Some("/b".to_string())));
        // Out-of-range pick is ignored.
        assert!(!tracker.pick(9, &results, None));
        assert_eq!(tracker.current().position(), Some(1));
    }

    #[test]
    fn reconcile_follows_identifier_across_replacement() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(1, &sequence(&[Some(1), Some(2), Some(3)]), None);

        // B (slab 2) moved from position 1 to position 1 of [C, B]; it must
        // be retained there rather than clamped to position 0.
        let replaced = sequence(&[Some(3), Some(2)]);
        tracker.reconcile(&replaced, |_| None);
        assert_eq!(tracker.current().position(), Some(1));
        assert_eq!(
            tracker.current(),
            &Selection::Pinned {
                position: 1,
                identifier: Some(slab(2)),
                path: None,
            }
        );
    }

    #[test]
    fn reconcile_moves_with_identifier() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(0, &sequence(&[Some(7), Some(8)]), Some("/seven".to_string()));

        let replaced = sequence(&[Some(8), Some(7)]);
        assert!(tracker.reconcile(&replaced, |position| {
            (position == 1).then(|| "/seven".to_string())
        }));
        assert_eq!(tracker.current().position(), Some(1));
        assert_eq!(tracker.current().path(), Some("/seven"));
    }

    #[test]
    fn reconcile_clamps_when_identifier_is_gone() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(2, &sequence(&[Some(1), Some(2), Some(3)]), Some("/c".to_string()));

        // Slab 3 disappeared and the list shrank; clamp to the last row.
        let replaced = sequence(&[Some(1), Some(2)]);
        assert!(tracker.reconcile(&replaced, |_| None));
        assert_eq!(
            tracker.current(),
            &Selection::Pinned {
                position: 1,
                identifier: Some(slab(2)),
                // Different logical item, path unknown until hydrated.
                path: None,
            }
        );
    }

    #[test]
    fn reconcile_keeps_path_when_position_is_unchanged() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(0, &sequence(&[Some(1)]), Some("/same".to_string()));

        // Identifier gone, clamp lands on the same position: the previous
        // path is still considered valid.
        let replaced = sequence(&[Some(9)]);
        assert!(tracker.reconcile(&replaced, |_| None));
        assert_eq!(
            tracker.current(),
            &Selection::Pinned {
                position: 0,
                identifier: Some(slab(9)),
                path: Some("/same".to_string()),
            }
        );
    }

    #[test]
    fn reconcile_empty_sequence_unpins() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(0, &sequence(&[Some(1)]), None);

        assert!(tracker.reconcile(&Vec::new(), |_| None));
        assert_eq!(tracker.current(), &Selection::Unselected);
        // Unselected stays unselected through further reconciles.
        assert!(!tracker.reconcile(&sequence(&[Some(1)]), |_| None));
    }

    #[test]
    fn reconcile_without_changes_reports_none() {
        let results = sequence(&[Some(1), Some(2)]);
        let mut tracker = SelectionTracker::new();
        tracker.pick(0, &results, Some("/a".to_string()));

        assert!(!tracker.reconcile(&results, |_| Some("/ignored".to_string())));
        assert_eq!(tracker.current().path(), Some("/a"));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(0, &sequence(&[Some(1)]), None);
        assert!(tracker.clear());
        assert!(!tracker.clear());
    }

    #[test]
    fn patch_path_applies_only_to_the_pinned_position() {
        let mut tracker = SelectionTracker::new();
        tracker.pick(1, &sequence(&[Some(1), Some(2)]), None);

        // Late resolution for a superseded position is dropped.
        assert!(!tracker.patch_path(0, "/stale".to_string()));
        assert!(tracker.patch_path(1, "/b".to_string()));
        assert_eq!(tracker.current().path(), Some("/b"));
        // Same path again is a no-op.
        assert!(!tracker.patch_path(1, "/b".to_string()));
    }
}
