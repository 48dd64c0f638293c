use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ISO_DAY: &str = "%Y-%m-%d";

/// Format a datetime according to the configured date format.
///
/// If `date_format` is `"relative"`, displays relative times like `"2h"`,
/// `"3d"`, `"1w"`. An empty format falls back to `YYYY-MM-DD`. Anything else
/// is used as a `strftime`-style pattern; an unparseable pattern also falls
/// back to `YYYY-MM-DD`.
pub(crate) fn format_date(dt: &DateTime<Utc>, date_format: &str) -> String {
    match date_format {
        "" => dt.format(ISO_DAY).to_string(),
        "relative" => format_relative_time(dt, Utc::now()),
        pattern if is_valid_date_format(pattern) => dt.format(pattern).to_string(),
        pattern => {
            tracing::warn!("ignoring invalid date format {pattern:?}");
            dt.format(ISO_DAY).to_string()
        }
    }
}

/// True when `date_format` is empty, `"relative"`, or a `strftime` pattern
/// chrono can render.
pub(crate) fn is_valid_date_format(date_format: &str) -> bool {
    date_format == "relative"
        || !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error))
}

/// Format a datetime as time elapsed before `now` (e.g., `"2h"`, `"3d"`).
fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m");
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h");
    }

    let days = duration.num_days();
    if days < 7 {
        return format!("{days}d");
    }
    if days < 30 {
        return format!("{}w", days / 7);
    }
    if days < 365 {
        return format!("{}mo", days / 30);
    }

    format!("{}y", days / 365)
}

/// Cut `text` to at most `max_width` display columns, ending in `...` when
/// shortened.
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}
