use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// `HH:MM:SS`, each field zero-padded to at least two digits.
///
/// Hours are not capped: 100 hours renders as `100:00:00`.
pub fn elapsed_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// A `[0, 1]` fraction as a percentage with one decimal, e.g. `42.5%`.
pub fn format_percent(fraction: f32) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_pads_fields() {
        assert_eq!(elapsed_time(0), "00:00:00");
        assert_eq!(elapsed_time(59), "00:00:59");
        assert_eq!(elapsed_time(3661), "01:01:01");
        assert_eq!(elapsed_time(86_399), "23:59:59");
    }

    #[test]
    fn elapsed_time_hours_exceed_two_digits() {
        assert_eq!(elapsed_time(360_000), "100:00:00");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(0.425), "42.5%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_unicode("/usr/bin/python3", 8), "/usr/bi\u{2026}");
        assert_eq!(truncate_unicode("short", 8), "short");
    }
}
