use tracing::debug;

use crate::core::{DirectiveKind, Edge, IntervalDirective, TimeUnit};

/// Parses a notation string into interval directives
///
/// Tokens are whitespace-separated and matched case-insensitively against the
/// grammar `[all|every]? [multiplier]? [first|last]? body`, where the body is
/// a quantity with an optional unit ("30s", "20"), a bare unit word
/// ("minutes"), or a fraction ("1/2", "3/4"). A token that does not match is
/// skipped; malformed input yields fewer directives, never an error.
pub fn parse(notation: &str) -> Vec<IntervalDirective> {
    notation
        .split_whitespace()
        .filter_map(|token| {
            let directive = parse_token(token);
            if directive.is_none() {
                debug!(token, "skipping unrecognized notation token");
            }
            directive
        })
        .collect()
}

/// Parses a single notation token, or returns None if it does not match
fn parse_token(raw: &str) -> Option<IntervalDirective> {
    let lowered = raw.to_ascii_lowercase();
    let mut cur = Cursor::new(&lowered);

    let mut every = false;
    let mut repeat_all = false;
    if cur.eat_word("every") {
        every = true;
    } else if cur.eat_word("all") {
        repeat_all = true;
    }

    // A number here is a repeat multiplier when an edge keyword or a second
    // number follows, otherwise it is the quantity itself ("30s", "45").
    let outer = cur.eat_number();

    let relative = if cur.eat_word("first") {
        Edge::First
    } else if cur.eat_word("last") {
        Edge::Last
    } else {
        Edge::None
    };

    let inner = cur.eat_number();

    if cur.eat_char('/') {
        return parse_fraction(raw, &mut cur, relative, repeat_all, every, inner.or(outer));
    }

    let unit = cur.eat_unit();
    if !cur.at_end() {
        return None;
    }

    // A bare unit word with no quantity means "announce at every <unit>".
    let (quantity, unit, bare_unit) = match (relative, outer, inner, unit) {
        (_, _, Some(q), Some(u)) => (q, u, false),
        (_, _, Some(q), None) => (q, TimeUnit::Seconds, false),
        (Edge::None, Some(q), None, Some(u)) => (q, u, false),
        (Edge::None, Some(q), None, None) => (q, TimeUnit::Seconds, false),
        (_, _, None, Some(u)) => (1, u, true),
        _ => return None,
    };
    if quantity == 0 {
        return None;
    }
    if bare_unit && !every {
        repeat_all = true;
    }

    // The outer number only acts as a multiplier when it did not already
    // serve as the quantity.
    let multiplier = match (relative, inner) {
        (Edge::None, None) => 1,
        _ => outer.unwrap_or(1),
    };

    Some(IntervalDirective {
        kind: DirectiveKind::Time { quantity, unit },
        relative,
        repeat_all,
        every,
        multiplier: if every { 0 } else { multiplier },
        source: raw.to_string(),
    })
}

/// Parses the tail of a fraction token after the '/' has been consumed
fn parse_fraction(
    raw: &str,
    cur: &mut Cursor,
    relative: Edge,
    repeat_all: bool,
    every: bool,
    numerator: Option<u64>,
) -> Option<IntervalDirective> {
    let denominator = cur.eat_number()?;
    if !cur.at_end() || !(2..=10).contains(&denominator) {
        return None;
    }
    let numerator = numerator.unwrap_or(1);
    if numerator == 0 {
        return None;
    }

    Some(IntervalDirective {
        kind: DirectiveKind::Fraction { denominator },
        relative,
        repeat_all,
        every,
        multiplier: if every { 0 } else { numerator },
        source: raw.to_string(),
    })
}

/// Byte cursor over a lowercased token
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    /// Consumes a keyword if the token continues with it
    fn eat_word(&mut self, word: &str) -> bool {
        if self.rest().starts_with(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    /// Consumes a single expected character
    fn eat_char(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes a run of ASCII digits; capped at nine digits so the value
    /// always fits in u64 arithmetic downstream
    fn eat_number(&mut self) -> Option<u64> {
        let digits: String = self.rest().chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() || digits.len() > 9 {
            return None;
        }
        self.pos += digits.len();
        digits.parse().ok()
    }

    /// Consumes a unit word, which must close the token
    fn eat_unit(&mut self) -> Option<TimeUnit> {
        let unit = match self.rest() {
            "s" | "sec" | "secs" | "second" | "seconds" => TimeUnit::Seconds,
            "m" | "min" | "mins" | "minute" | "minutes" => TimeUnit::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => TimeUnit::Hours,
            _ => return None,
        };
        self.pos = self.text.len();
        Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(token: &str) -> IntervalDirective {
        let parsed = parse(token);
        assert_eq!(parsed.len(), 1, "token {:?} should parse", token);
        parsed.into_iter().next().unwrap()
    }

    #[test]
    fn test_simple_seconds() {
        let d = one("30s");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 30, unit: TimeUnit::Seconds });
        assert_eq!(d.relative, Edge::None);
        assert!(!d.repeat_all);
        assert!(!d.every);
        assert_eq!(d.multiplier, 1);
        assert_eq!(d.source, "30s");
    }

    #[test]
    fn test_bare_number_defaults_to_seconds() {
        let d = one("45");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 45, unit: TimeUnit::Seconds });
        assert!(!d.repeat_all);
    }

    #[test]
    fn test_bare_unit_word_repeats() {
        let d = one("minutes");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 1, unit: TimeUnit::Minutes });
        assert!(d.repeat_all, "a unit word alone announces at every unit");
        assert_eq!(d.relative, Edge::None);
    }

    #[test]
    fn test_last_with_quantity() {
        let d = one("last20");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 20, unit: TimeUnit::Seconds });
        assert_eq!(d.relative, Edge::Last);
        assert!(!d.repeat_all);
    }

    #[test]
    fn test_all_last_countdown() {
        let d = one("allLast10");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 10, unit: TimeUnit::Seconds });
        assert_eq!(d.relative, Edge::Last);
        assert!(d.repeat_all);
        assert!(!d.every);
    }

    #[test]
    fn test_every_forces_cadence() {
        let d = one("everyLast2m");
        assert_eq!(d.kind, DirectiveKind::Time { quantity: 2, unit: TimeUnit::Minutes });
        assert_eq!(d.relative, Edge::Last);
        assert!(d.every);
        assert!(!d.repeat_all);
        assert_eq!(d.multiplier, 0);
    }

    #[test]
    fn test_halfway_fraction() {
        let d = one("1/2");
        assert_eq!(d.kind, DirectiveKind::Fraction { denominator: 2 });
        assert_eq!(d.multiplier, 1);
    }

    #[test]
    fn test_fraction_with_numerator() {
        let d = one("3/4");
        assert_eq!(d.kind, DirectiveKind::Fraction { denominator: 4 });
        assert_eq!(d.multiplier, 3);
    }

    #[test]
    fn test_relative_fraction() {
        let d = one("first2/5");
        assert_eq!(d.kind, DirectiveKind::Fraction { denominator: 5 });
        assert_eq!(d.relative, Edge::First);
        assert_eq!(d.multiplier, 2);
    }

    #[test]
    fn test_case_insensitive() {
        let d = one("ALLlast10");
        assert_eq!(d.relative, Edge::Last);
        assert!(d.repeat_all);
        assert_eq!(d.source, "ALLlast10");
    }

    #[test]
    fn test_multiple_tokens() {
        let parsed = parse("1/2 30s last20 allLast10");
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn test_malformed_tokens_skipped() {
        assert!(parse("").is_empty());
        assert!(parse("bogus").is_empty());
        assert!(parse("last").is_empty());
        assert!(parse("0s").is_empty());
        assert!(parse("1/11").is_empty());
        assert!(parse("1/1").is_empty());
        assert!(parse("30x").is_empty());
        assert!(parse("30s!").is_empty());
    }

    #[test]
    fn test_bad_tokens_do_not_poison_good_ones() {
        let parsed = parse("bogus 30s 1/99 minutes");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].source, "30s");
        assert_eq!(parsed[1].source, "minutes");
    }
}
