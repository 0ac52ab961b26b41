use crate::core::TimeComponents;

/// Fixed phrase for the midpoint announcement
pub const HALF_PHRASE: &str = "half way";

/// Suffix for announcements measured toward the end of the countdown
pub const SUFFIX_TO_GO: &str = "to go";

/// Suffix for announcements measured from the start of the countdown
pub const SUFFIX_GONE: &str = "gone";

/// Below this, time phrases render as a seconds count
const SECONDS_PHRASE_MS: u64 = 20_000;

/// At or below this, an unforced phrase is a bare number for the terminal
/// digit countdown
const BARE_NUMBER_MS: u64 = 10_000;

/// Renders the phrase for a time-based announcement
///
/// `distance_ms` is the announcement's distance from its edge of the
/// countdown, not a wall-clock value. Short distances render as a bare digit
/// unless `force_suffix` is set.
pub fn time_phrase(distance_ms: u64, suffix: &str, force_suffix: bool) -> String {
    if distance_ms < SECONDS_PHRASE_MS {
        let seconds = distance_ms / 1_000;
        if force_suffix || distance_ms > BARE_NUMBER_MS {
            format!("{} {}", count_unit(seconds, "second"), suffix)
        } else {
            seconds.to_string()
        }
    } else {
        let c = TimeComponents::from_millis(distance_ms);
        let mut parts = Vec::new();
        if c.hours > 0 {
            parts.push(count_unit(c.hours, "hour"));
        }
        if c.minutes > 0 {
            parts.push(count_unit(c.minutes, "minute"));
        }
        if c.seconds > 0 {
            parts.push(count_unit(c.seconds, "second"));
        }
        format!("{} {}", parts.join(", "), suffix)
    }
}

/// Renders the phrase for a fraction-based announcement
///
/// The fraction is reduced when the denominator divides evenly by the
/// numerator; anything that reduces to a half yields the fixed half phrase.
pub fn fraction_phrase(numerator: u64, denominator: u64) -> String {
    let (n, d) = reduce(numerator, denominator);
    if d == 2 {
        return HALF_PHRASE.to_string();
    }
    count_unit(n, ordinal(d))
}

/// Whether a fraction reduces to the dedicated halfway case
pub fn reduces_to_half(numerator: u64, denominator: u64) -> bool {
    reduce(numerator, denominator).1 == 2
}

fn reduce(numerator: u64, denominator: u64) -> (u64, u64) {
    if numerator > 1 && denominator % numerator == 0 && denominator / numerator >= 2 {
        (1, denominator / numerator)
    } else {
        (numerator, denominator)
    }
}

fn ordinal(denominator: u64) -> &'static str {
    match denominator {
        3 => "third",
        4 => "fourth",
        5 => "fifth",
        6 => "sixth",
        7 => "seventh",
        8 => "eighth",
        9 => "ninth",
        _ => "tenth",
    }
}

fn count_unit(count: u64, word: &str) -> String {
    if count == 1 {
        format!("1 {}", word)
    } else {
        format!("{} {}s", count, word)
    }
}
