//! Notification message formatting.
//!
//! Messages are rendered for a MarkdownV2 transport: track names are
//! emphasized with `*`, and after assembly every reserved character is
//! backslash-escaped.

use super::values::ValueSet;

/// Characters that must be backslash-escaped in the finished message.
/// `*` is deliberately absent: it carries the emphasis around track names.
const RESERVED_CHARS: &[char] = &[
    '_', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Render the per-track counter blocks for a notification.
///
/// Each track in `observed` gets a block of its three counters, with a
/// percent change against `known` where one can be computed. Blocks are
/// joined by a blank line and the result is escaped for transport.
pub fn format_message(observed: &ValueSet, known: &ValueSet) -> String {
    let blocks: Vec<String> = observed
        .iter()
        .map(|(name, stats)| {
            let prev = known.get(name);
            [
                format!("*{}:*", name),
                counter_line("Streams", stats.streams, prev.map(|p| p.streams)),
                counter_line("Listeners", stats.listeners, prev.map(|p| p.listeners)),
                counter_line("Saves", stats.saves, prev.map(|p| p.saves)),
            ]
            .join("\n")
        })
        .collect();

    escape_reserved(&blocks.join("\n\n"))
}

fn counter_line(label: &str, current: u64, known: Option<u64>) -> String {
    match percent_diff(current, known) {
        Some(diff) => format!("{}: {} {}", label, current, diff),
        None => format!("{}: {}", label, current),
    }
}

/// Percent change against the known value, e.g. `(+50.00%)`.
///
/// Omitted when there is no known value, the known value is zero, or the
/// value is unchanged.
fn percent_diff(current: u64, known: Option<u64>) -> Option<String> {
    let known = known?;
    if known == 0 || current == known {
        return None;
    }
    let percent = ((current as f64 - known as f64) * 100.0 / known as f64).abs();
    let sign = if current > known { '+' } else { '-' };
    Some(format!("({}{:.2}%)", sign, percent))
}

/// Escape every reserved character with a preceding backslash.
pub fn escape_reserved(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
