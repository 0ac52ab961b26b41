use crate::core::{Error, Result, TimeComponents, MAX_DURATION_MS, SECOND_MS};

/// Parses duration text into milliseconds
///
/// Accepts "SS", "MM:SS", or "HH:MM:SS" (hours 0-24, minutes and seconds
/// 0-59), or a bare integer second count. The result is clamped to 24 hours.
/// Anything else is a configuration error.
pub fn parse_duration(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::config("empty duration"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let fields: Vec<u64> = parts
        .iter()
        .map(|p| parse_field(p, trimmed))
        .collect::<Result<_>>()?;

    let seconds = match fields.as_slice() {
        [s] => *s,
        [m, s] => {
            check_range(*m, 59, "minutes", trimmed)?;
            check_range(*s, 59, "seconds", trimmed)?;
            m * 60 + s
        }
        [h, m, s] => {
            check_range(*h, 24, "hours", trimmed)?;
            check_range(*m, 59, "minutes", trimmed)?;
            check_range(*s, 59, "seconds", trimmed)?;
            h * 3_600 + m * 60 + s
        }
        _ => return Err(Error::config(format!("unrecognized duration {:?}", trimmed))),
    };

    Ok((seconds * SECOND_MS).min(MAX_DURATION_MS))
}

fn parse_field(part: &str, whole: &str) -> Result<u64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) || part.len() > 9 {
        return Err(Error::config(format!("unrecognized duration {:?}", whole)));
    }
    part.parse()
        .map_err(|_| Error::config(format!("unrecognized duration {:?}", whole)))
}

fn check_range(value: u64, max: u64, field: &str, whole: &str) -> Result<()> {
    if value > max {
        Err(Error::config(format!("{} out of range in {:?}", field, whole)))
    } else {
        Ok(())
    }
}

/// Decomposes milliseconds into display components
pub fn to_components(ms: u64) -> TimeComponents {
    TimeComponents::from_millis(ms)
}

/// Recomposes display components into milliseconds
pub fn to_millis(components: &TimeComponents) -> u64 {
    components.to_millis()
}

/// Renders components as a colon-joined clock string
///
/// With `suppress_leading_zeros` the fields that are zero from the left are
/// omitted; the first rendered field is unpadded and the rest are two digits.
/// `show_tenths` appends the smaller-weight tenths digit.
pub fn format(components: &TimeComponents, suppress_leading_zeros: bool, show_tenths: bool) -> String {
    let fields = [components.hours, components.minutes, components.seconds];
    let start = if suppress_leading_zeros {
        fields.iter().position(|f| *f > 0).unwrap_or(fields.len() - 1)
    } else {
        0
    };

    let mut out = String::new();
    for (i, field) in fields[start..].iter().enumerate() {
        if i == 0 {
            out.push_str(&field.to_string());
        } else {
            out.push_str(&format!(":{:02}", field));
        }
    }
    if show_tenths {
        out.push_str(&format!(".{}", components.tenths));
    }
    out
}
