use std::collections::VecDeque;

use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::{
    Announcement, DirectiveKind, IntervalDirective, MergeOrder, CLOSENESS_WINDOW_MS, DENSE_ZONE_MS,
};

use super::generator;

/// Deduplicated, descending-ordered queue of announcements for one countdown run
///
/// The head is always the announcement with the largest remaining-time value,
/// which is the next one due as the countdown proceeds. The schedule mutates
/// only by popping its head; a fresh one is built from the canonical
/// directives on every reset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    entries: VecDeque<Announcement>,
}

impl Schedule {
    /// Builds a schedule from parsed directives and a total duration
    ///
    /// Directives are expanded in merge-priority order, then filtered: offsets
    /// outside (0, duration) are dropped, exact duplicates keep their first
    /// occurrence, and an offset landing within the closeness window of an
    /// already accepted one is dropped unless it sits in the dense near-zero
    /// band.
    pub fn build(directives: &[IntervalDirective], duration_ms: u64, order: MergeOrder) -> Self {
        let mut raw = Vec::new();
        for directive in ordered(directives, order) {
            raw.extend(generator::expand(directive, duration_ms));
        }

        let mut accepted: Vec<Announcement> = Vec::with_capacity(raw.len());
        for ann in raw {
            if ann.offset_ms == 0 || ann.offset_ms >= duration_ms {
                continue;
            }
            if accepted.iter().any(|a| a.offset_ms == ann.offset_ms) {
                continue;
            }
            let crowded = accepted
                .iter()
                .any(|a| a.offset_ms.abs_diff(ann.offset_ms) < CLOSENESS_WINDOW_MS);
            if crowded && ann.offset_ms > DENSE_ZONE_MS {
                trace!(offset_ms = ann.offset_ms, "dropping announcement too close to an accepted one");
                continue;
            }
            accepted.push(ann);
        }

        accepted.sort_by(|a, b| b.offset_ms.cmp(&a.offset_ms));
        Schedule {
            entries: accepted.into(),
        }
    }

    /// Returns the next announcement due, without consuming it
    pub fn head(&self) -> Option<&Announcement> {
        self.entries.front()
    }

    /// Removes and returns the next announcement due
    pub fn pop(&mut self) -> Option<Announcement> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The remaining offsets in dispatch order
    pub fn offsets(&self) -> Vec<u64> {
        self.entries.iter().map(|a| a.offset_ms).collect()
    }
}

/// Applies the merge-priority mode to the directive evaluation order
fn ordered(directives: &[IntervalDirective], order: MergeOrder) -> Vec<&IntervalDirective> {
    let mut refs: Vec<&IntervalDirective> = directives.iter().collect();
    match order {
        MergeOrder::TokenOrder => {}
        MergeOrder::FractionFirst => {
            refs.sort_by_key(|d| !matches!(d.kind, DirectiveKind::Fraction { .. }));
        }
        MergeOrder::TimeFirst => {
            refs.sort_by_key(|d| !matches!(d.kind, DirectiveKind::Time { .. }));
        }
    }
    refs
}
