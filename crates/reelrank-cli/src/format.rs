//! Human-oriented number and age formatting for table output.

const SECONDS_PER_DAY: i64 = 86_400;

/// Compact count: `999`, `12.5K`, `1.2M`.
pub(crate) fn compact(n: f64) -> String {
    if !n.is_finite() {
        return "\u{2014}".to_string();
    }
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{}", n.round())
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn compact_count(n: u64) -> String {
    compact(n as f64)
}

/// Age of `timestamp` relative to `now`, e.g. `today`, `5d ago`, `3mo ago`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ago(timestamp: i64, now: i64) -> String {
    if timestamp <= 0 {
        return "\u{2014}".to_string();
    }
    let days = now.saturating_sub(timestamp).div_euclid(SECONDS_PER_DAY);
    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=29 => format!("{days}d ago"),
        30..=364 => format!("{}mo ago", days / 30),
        _ => format!("{:.1}y ago", days as f64 / 365.0),
    }
}

pub(crate) fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Truncates to `max` characters, appending `...` when shortened.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let single_line: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if single_line.chars().count() > max {
        format!("{}...", single_line.chars().take(max).collect::<String>())
    } else {
        single_line
    }
}
