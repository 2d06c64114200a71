//! Cell markup for rendered output
//!
//! Cells are decorated in two steps: URLs become anchor tags, then search
//! matches are wrapped in `<mark>`. URL boundaries are found against the
//! raw text and everything emitted is HTML-escaped.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("URL pattern compiles")
});

const MARK_OPEN: &str =
    r#"<mark style="background-color: #ffeb3b; padding: 1px 2px; border-radius: 2px;">"#;

/// Escape text for safe interpolation into HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

/// Escape text and wrap any URLs in anchor tags
pub fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in URL_RE.find_iter(text) {
        out.push_str(&escape_html(&text[last..found.start()]));
        let url = escape_html(found.as_str());
        out.push_str("<a href=\"");
        out.push_str(&url);
        out.push_str("\" target=\"_blank\">");
        out.push_str(&url);
        out.push_str("</a>");
        last = found.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Wrap case-insensitive matches of `term` in a highlight mark
///
/// `text` is already escaped, so the term is escaped the same way before
/// matching.
pub fn highlight(text: &str, term: &str) -> String {
    let needle = escape_html(term.trim());
    if needle.is_empty() {
        return text.to_string();
    }
    let pattern = match Regex::new(&format!("(?i){}", regex::escape(&needle))) {
        Ok(pattern) => pattern,
        Err(_) => return text.to_string(),
    };
    pattern
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}</mark>", MARK_OPEN, &caps[0])
        })
        .into_owned()
}

/// Produce the display markup for one cell
///
/// URLs are linkified first. When a search term is active and the cell
/// contains a link, only the text before the first link is highlighted so
/// marks never land inside an anchor tag.
pub fn decorate_cell(text: &str, search_term: Option<&str>) -> String {
    if text.is_empty() {
        return String::new();
    }
    let processed = linkify(text);
    let term = match search_term.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => term,
        None => return processed,
    };
    match processed.find("<a href=") {
        Some(index) => {
            let (head, tail) = processed.split_at(index);
            format!("{}{}", highlight(head, term), tail)
        }
        None => highlight(&processed, term),
    }
}
