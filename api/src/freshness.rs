use chrono::{DateTime, Utc};

/// Human "last updated" text for a payload stamped `then`, as seen at `now`.
///
/// Anything up to a full minute old (or stamped in the future) reads
/// "Just now"; hours are floored, so 90 minutes is still "1 hour ago".
pub fn last_updated_label(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return "Unknown".to_string();
    };

    let elapsed = (now - then).num_seconds();
    if elapsed <= 60 {
        return "Just now".to_string();
    }

    let minutes = elapsed / 60;
    if minutes < 60 {
        return format!("{minutes} minute{} ago", plural(minutes));
    }

    let hours = minutes / 60;
    format!("{hours} hour{} ago", plural(hours))
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
