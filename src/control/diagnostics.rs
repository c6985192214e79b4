/// Token that introduces the capture tool's own error text inside a raw
/// diagnostic blob.
const TOOL_MARKER: &str = "tshark:";

/// Summarize a raw diagnostic string from the capture/filter tool into
/// something short enough to show the user.
///
/// Heuristic over free-form text: take what follows the first
/// `tshark:` marker, cut off the echoed filter expression when the tool
/// printed one with a caret under it, and stop at the first line break.
/// Never fails; when the text has no recognizable shape the trimmed
/// remainder is returned as-is.
pub fn summarize(raw: &str) -> String {
    let Some(idx) = raw.find(TOOL_MARKER) else {
        return raw.to_string();
    };
    let mut rest = raw[idx + TOOL_MARKER.len()..].trim();

    // The tool echoes the offending expression in parentheses and points
    // at it with a caret on the same or the next line. Everything from
    // the parenthesis on is noise for a one-line summary.
    if let (Some(paren), Some(caret)) = (rest.find('('), rest.find('^')) {
        if caret > paren {
            rest = rest[..paren].trim_end();
        }
    }

    if let Some(newline) = rest.find('\n') {
        rest = rest[..newline].trim_end();
    }

    rest.trim().to_string()
}
