use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only; `\d` would also accept other Unicode digit scripts.
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+:)?([0-9]+):([0-9]+)").expect("timestamp pattern"));

/// Find the first `H:MM:SS` or `MM:SS` reference in `text` and return it in seconds.
///
/// Returns `None` when the text carries no timestamp, so a comment pointing at
/// `0:00` stays distinguishable from one without any time reference. Only the
/// first match counts; later timestamps in the same text are ignored. A group
/// that does not fit in a `u64` counts as 0.
pub fn extract_timestamp(text: &str) -> Option<u64> {
    let caps = TIMESTAMP_RE.captures(text)?;
    let group = |i: usize| {
        caps.get(i)
            .map(|m| parse_component(m.as_str().trim_end_matches(':')))
            .unwrap_or(0)
    };

    let (hours, minutes, seconds) = (group(1), group(2), group(3));
    Some(
        hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds),
    )
}

fn parse_component(raw: &str) -> u64 {
    raw.parse().unwrap_or(0)
}

/// Render seconds as `M:SS`, or `H:MM:SS` past the hour.
pub fn format_timestamp(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(extract_timestamp("check out 1:23:45 now"), Some(5025));
    }

    #[test]
    fn parses_minutes_seconds() {
        assert_eq!(extract_timestamp("the drop at 12:34 is insane"), Some(754));
        assert_eq!(extract_timestamp("3:07"), Some(187));
    }

    #[test]
    fn missing_timestamp_is_not_zero() {
        assert_eq!(extract_timestamp("no time here"), None);
        assert_eq!(extract_timestamp(""), None);
        assert_eq!(extract_timestamp("at 0:00 he trips"), Some(0));
    }

    #[test]
    fn only_first_match_counts() {
        assert_eq!(extract_timestamp("10:30 and then 20:00"), Some(630));
    }

    #[test]
    fn overflowing_component_counts_as_zero() {
        assert_eq!(extract_timestamp("99999999999999999999999:05"), Some(5));
    }

    #[test]
    fn non_ascii_digits_do_not_match() {
        assert_eq!(extract_timestamp("١٢:٣٤"), None);
    }

    #[test]
    fn formats_for_display() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(187), "3:07");
        assert_eq!(format_timestamp(5025), "1:23:45");
    }
}
