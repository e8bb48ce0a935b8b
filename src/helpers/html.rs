//! HTML helper functions

/// Text appended to a truncated preview, before the link
const PREVIEW_ELLIPSIS: &str = "...";

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate text to at most `length` characters without splitting a word.
///
/// Returns `None` when the text already fits.
pub fn truncate_words(s: &str, length: usize) -> Option<String> {
    if s.chars().count() <= length {
        return None;
    }

    let head: String = s.chars().take(length).collect();
    let next_is_break = s
        .chars()
        .nth(length)
        .map(char::is_whitespace)
        .unwrap_or(true);

    let cut = if next_is_break {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(pos) => &head[..pos],
            // A single word longer than the limit is cut mid-word
            None => head.as_str(),
        }
    };

    Some(cut.trim_end().to_string())
}

/// Build a post preview from rendered HTML.
///
/// The visible text is kept in full when it fits in `length` characters;
/// otherwise it is cut at a word boundary and followed by a link to `url`.
pub fn preview(html: &str, length: usize, url: &str) -> String {
    let text = collapse_whitespace(&strip_html(html));
    match truncate_words(&text, length) {
        Some(cut) => format!(
            r#"{}{} <a href="{}">Continue&rarr;</a>"#,
            cut, PREVIEW_ELLIPSIS, url
        ),
        None => text,
    }
}
