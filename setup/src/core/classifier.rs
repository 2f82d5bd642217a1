//! Log-line classification pipeline.
//!
//! Turns one raw line of script output into zero, one, or two structured
//! entries: ANSI stripping, bracketed-tag and trailing-color classification,
//! sub-detail detection, lifecycle-sentinel suppression, and step-boundary
//! separators.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::{LogEntry, LogRole};

/// Recognized output tags, in priority order, with their display color and
/// role icon.
static TAGS: [(&str, LogRole, &str, char); 4] = [
    ("[ERROR]", LogRole::Error, "#FF5555", '✖'),
    ("[WARNING]", LogRole::Warning, "#FFFF00", '!'),
    ("[SUCCESS]", LogRole::Success, "#00FF00", '✔'),
    ("[INFO]", LogRole::Info, "#00FFFF", '•'),
];

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*m").expect("ansi regex"));

static ANSI_PARAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[([0-9;]+)m").expect("ansi params regex"));

/// Lifecycle marker emitted by every installer script on completion.
static SENTINEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^finished .* script\.?$").expect("sentinel regex"));

/// Decorative glyphs stripped from display text: pictographs plus the
/// variation selector and joiner that ride along with them.
static PICTOGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\u{FE0F}\u{200D}]").expect("pictograph regex")
});

/// Remove ANSI SGR escape sequences.
pub fn strip_ansi(input: &str) -> String {
    ANSI_RE.replace_all(input, "").into_owned()
}

/// Classify one raw output line into log entries.
///
/// `first_emission` is true while nothing has been emitted since the run
/// started; it suppresses the leading step separator. Returns zero entries
/// for suppressed sentinels and two when a separator precedes the real
/// entry.
pub fn classify_line(raw: &str, first_emission: bool) -> Vec<LogEntry> {
    let stripped = strip_ansi(raw);
    if SENTINEL_RE.is_match(stripped.trim()) {
        return Vec::new();
    }

    let dim = stripped.starts_with("    ");
    let tag = TAGS.iter().find(|(tag, ..)| stripped.contains(tag));
    let (role, fg, icon, text) = match tag {
        Some(&(tag, role, color, icon)) => {
            (role, Some(color), Some(icon), strip_tag(&stripped, tag))
        }
        None => match trailing_fg_color(raw) {
            Some(color) => (LogRole::Plain, Some(color), None, stripped),
            None => (LogRole::Plain, None, None, stripped),
        },
    };

    let mut text = PICTOGRAPH_RE.replace_all(&text, "").into_owned();
    text.truncate(text.trim_end().len());
    if dim {
        text = text.trim_start().to_string();
    }

    let entry = LogEntry {
        text,
        role,
        fg,
        dim,
        icon,
        separator: false,
    };

    let mut out = Vec::with_capacity(2);
    if entry.role == LogRole::Info && !entry.dim && !first_emission {
        out.push(LogEntry::separator());
    }
    out.push(entry);
    out
}

/// Foreground color of the last ANSI escape sequence in the raw line, if the
/// sequence carries a basic (30–37) or bright (90–97) fg code.
fn trailing_fg_color(raw: &str) -> Option<&'static str> {
    let caps = ANSI_PARAMS_RE.captures_iter(raw).last()?;
    let params = caps.get(1)?.as_str();
    params
        .split(';')
        .filter_map(|param| param.parse::<u32>().ok())
        .find_map(ansi_fg_hex)
}

fn ansi_fg_hex(code: u32) -> Option<&'static str> {
    let hex = match code {
        30 => "#000000",
        31 => "#FF5555",
        32 => "#00FF00",
        33 => "#FFFF00",
        34 => "#00AAFF",
        35 => "#FF00FF",
        36 => "#00FFFF",
        37 => "#FFFFFF",
        90 => "#666666",
        91 => "#FF6E6E",
        92 => "#69FF69",
        93 => "#FFFF88",
        94 => "#33BBFF",
        95 => "#FF66FF",
        96 => "#66FFFF",
        97 => "#FFFFFF",
        _ => return None,
    };
    Some(hex)
}

/// Drop the tag and the whitespace that follows it from display text.
fn strip_tag(text: &str, tag: &str) -> String {
    match text.find(tag) {
        Some(pos) => {
            let mut out = String::with_capacity(text.len() - tag.len());
            out.push_str(&text[..pos]);
            out.push_str(text[pos + tag.len()..].trim_start());
            out
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(raw: &str) -> LogEntry {
        let entries = classify_line(raw, true);
        assert_eq!(entries.len(), 1, "expected one entry for {raw:?}");
        entries.into_iter().next().expect("entry")
    }

    #[test]
    fn error_tag_classifies_and_strips() {
        let entry = single("[ERROR] boom");
        assert_eq!(entry.role, LogRole::Error);
        assert_eq!(entry.text, "boom");
        assert_eq!(entry.fg, Some("#FF5555"));
        assert_eq!(entry.icon, Some('✖'));
        assert!(!entry.dim);
    }

    #[test]
    fn four_leading_spaces_mark_a_sub_detail() {
        let entry = single("    sub detail");
        assert!(entry.dim);
        assert_eq!(entry.text, "sub detail");
    }

    #[test]
    fn three_leading_spaces_stay_top_level() {
        let entry = single("   not a sub detail");
        assert!(!entry.dim);
    }

    #[test]
    fn sentinel_lines_are_suppressed() {
        assert!(classify_line("Finished brew install script.", true).is_empty());
        assert!(classify_line("finished NVM script", false).is_empty());
    }

    #[test]
    fn tag_beats_trailing_ansi_color() {
        let entry = single("\x1B[32m[ERROR] still an error\x1B[0m");
        assert_eq!(entry.role, LogRole::Error);
        assert_eq!(entry.fg, Some("#FF5555"));
    }

    #[test]
    fn last_ansi_sequence_wins_for_untagged_lines() {
        let entry = single("\x1B[31mred then \x1B[1;36mcyan");
        assert_eq!(entry.role, LogRole::Plain);
        assert_eq!(entry.fg, Some("#00FFFF"));
        assert_eq!(entry.text, "red then cyan");
    }

    #[test]
    fn reset_only_sequence_leaves_no_color() {
        let entry = single("plain\x1B[0m");
        assert_eq!(entry.fg, None);
    }

    #[test]
    fn bright_codes_map_to_the_bright_palette() {
        let entry = single("\x1B[92mgreenish");
        assert_eq!(entry.fg, Some("#69FF69"));
    }

    #[test]
    fn pictographs_are_stripped_from_text_only() {
        let entry = single("[SUCCESS] 🍺 brew installed");
        assert_eq!(entry.role, LogRole::Success);
        assert_eq!(entry.text, " brew installed");
    }

    #[test]
    fn info_line_gets_a_separator_unless_first() {
        let first = classify_line("[INFO] Installing Node.js", true);
        assert_eq!(first.len(), 1);

        let later = classify_line("[INFO] Installing Bun", false);
        assert_eq!(later.len(), 2);
        assert!(later[0].separator);
        assert!(later[0].text.is_empty());
        assert_eq!(later[1].role, LogRole::Info);
        assert_eq!(later[1].text, "Installing Bun");
    }

    #[test]
    fn indented_info_line_gets_no_separator() {
        let entries = classify_line("    [INFO] nested", false);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].dim);
        assert_eq!(entries[0].role, LogRole::Info);
    }
}
