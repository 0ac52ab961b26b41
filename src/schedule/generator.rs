use crate::core::{Announcement, DirectiveKind, Edge, IntervalDirective, TimeUnit, CLOSENESS_WINDOW_MS};

use super::message::{self, HALF_PHRASE, SUFFIX_GONE, SUFFIX_TO_GO};

/// Expands one directive into raw announcements for a countdown of `total_ms`
///
/// Offsets are remaining-time values. The result is unfiltered and unordered;
/// the schedule builder applies the closeness and bounds rules.
pub fn expand(directive: &IntervalDirective, total_ms: u64) -> Vec<Announcement> {
    match directive.kind {
        DirectiveKind::Fraction { denominator } => expand_fraction(directive, denominator, total_ms),
        DirectiveKind::Time { quantity, unit } => expand_time(directive, quantity, unit, total_ms),
    }
}

fn expand_fraction(directive: &IntervalDirective, denominator: u64, total_ms: u64) -> Vec<Announcement> {
    let interval = total_ms / denominator;

    // Dedicated halfway case
    if denominator == 2 {
        return vec![Announcement::new(total_ms / 2, HALF_PHRASE)];
    }

    let count = if directive.multiplier == 0 || directive.multiplier >= denominator {
        denominator
    } else {
        directive.multiplier
    };

    let mut out = Vec::new();
    match directive.relative {
        Edge::First | Edge::Last => {
            let suffix = edge_suffix(directive.relative);
            for a in 1..=count {
                let distance = interval * a;
                out.push(Announcement::new(
                    edge_offset(directive.relative, total_ms, distance),
                    fraction_message(a, denominator, suffix),
                ));
            }
        }
        Edge::None => {
            // Symmetric pairs: each fractional mark heard once from each end
            for a in 1..=count / 2 {
                let distance = interval * a;
                out.push(Announcement::new(
                    distance,
                    fraction_message(a, denominator, SUFFIX_TO_GO),
                ));
                out.push(Announcement::new(
                    total_ms - distance,
                    fraction_message(a, denominator, SUFFIX_GONE),
                ));
            }
        }
    }

    // A fractional mark landing near the midpoint collapses into the
    // canonical half announcement rather than competing with it
    let half = total_ms / 2;
    for ann in out.iter_mut() {
        if ann.offset_ms.abs_diff(half) < CLOSENESS_WINDOW_MS {
            *ann = Announcement::new(half, HALF_PHRASE);
        }
    }
    out
}

fn expand_time(
    directive: &IntervalDirective,
    quantity: u64,
    unit: TimeUnit,
    total_ms: u64,
) -> Vec<Announcement> {
    let unit_ms = unit.millis();
    let interval0 = quantity.saturating_mul(unit_ms);
    if interval0 == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    if directive.every {
        // Fixed cadence from the anchored edge, unit word always spoken
        let edge = anchored_edge(directive.relative);
        let suffix = edge_suffix(edge);
        let count = total_ms / interval0;
        for a in (1..=count).rev() {
            let distance = interval0 * a;
            out.push(Announcement::new(
                edge_offset(edge, total_ms, distance),
                message::time_phrase(distance, suffix, true),
            ));
        }
    } else if directive.repeat_all {
        match directive.relative {
            Edge::None => {
                // Symmetric pairs walking in from both ends
                let mut distance = interval0;
                while distance <= total_ms / 2 {
                    out.push(Announcement::new(
                        distance,
                        message::time_phrase(distance, SUFFIX_TO_GO, false),
                    ));
                    out.push(Announcement::new(
                        total_ms - distance,
                        message::time_phrase(distance, SUFFIX_GONE, false),
                    ));
                    distance += interval0;
                }
            }
            edge => {
                // Literal countdown of `quantity` unit ticks from the edge
                let suffix = edge_suffix(edge);
                for a in 1..=quantity {
                    let distance = unit_ms * a;
                    if distance > total_ms {
                        break;
                    }
                    out.push(Announcement::new(
                        edge_offset(edge, total_ms, distance),
                        message::time_phrase(distance, suffix, false),
                    ));
                }
            }
        }
    } else {
        // One-shot marker, measured from the end unless "first" was given
        let edge = anchored_edge(directive.relative);
        out.push(Announcement::new(
            edge_offset(edge, total_ms, interval0),
            message::time_phrase(interval0, edge_suffix(edge), false),
        ));
    }
    out
}

/// Default edge is the end of the countdown
fn anchored_edge(relative: Edge) -> Edge {
    match relative {
        Edge::First => Edge::First,
        _ => Edge::Last,
    }
}

fn edge_suffix(edge: Edge) -> &'static str {
    match edge {
        Edge::First => SUFFIX_GONE,
        _ => SUFFIX_TO_GO,
    }
}

/// Converts a distance from an edge into a remaining-time offset
fn edge_offset(edge: Edge, total_ms: u64, distance: u64) -> u64 {
    match edge {
        Edge::First => total_ms.saturating_sub(distance),
        _ => distance,
    }
}

fn fraction_message(numerator: u64, denominator: u64, suffix: &str) -> String {
    if message::reduces_to_half(numerator, denominator) {
        HALF_PHRASE.to_string()
    } else {
        format!("{} {}", message::fraction_phrase(numerator, denominator), suffix)
    }
}
