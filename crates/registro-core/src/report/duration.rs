/// Shown instead of a duration that came out negative.
pub const UNAVAILABLE: &str = "N/A";

/// Formats milliseconds as "1h 2m 3s", "2m 3s" or "3s".
///
/// Sub-second remainders are floored. Negative input yields [`UNAVAILABLE`].
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return UNAVAILABLE.to_string();
    }

    let secs = ms / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(65_000), "1m 5s");
        assert_eq!(format_duration(3_000), "3s");
        assert_eq!(format_duration(3_999), "3s");
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(3_723_000), "1h 2m 3s");
    }

    #[test]
    fn test_negative_is_unavailable() {
        assert_eq!(format_duration(-1), "N/A");
    }
}
