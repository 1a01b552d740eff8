//! Untrusted-text handling for backend strings (symbols, reasons, log lines).

/// Escapes text for use inside HTML element content or quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drops control characters so backend text cannot inject terminal escape
/// sequences. Tabs and newlines become single spaces.
pub fn sanitize_terminal(raw: &str) -> String {
    raw.chars()
        .filter_map(|ch| match ch {
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}
