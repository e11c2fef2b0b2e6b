//! Conversions for the light markdown in bot lines.
//!
//! Bot lines only ever use `**bold**` and blank-line paragraph breaks. The web
//! page wants that as HTML; speech engines want it gone entirely.

use regex::Regex;

/// Convert a bot line to HTML safe to assign to `innerHTML`.
pub fn markdown_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // 1. Escape HTML special characters
    let mut html = html_escape::encode_text(text).into_owned();

    // 2. Bold **text** or __text__
    let re_bold_star = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    html = re_bold_star
        .replace_all(&html, "<strong>$1</strong>")
        .into_owned();
    let re_bold_under = Regex::new(r"__(.+?)__").unwrap();
    html = re_bold_under
        .replace_all(&html, "<strong>$1</strong>")
        .into_owned();

    // 3. Line breaks
    html.replace('\n', "<br>")
}

/// Plain text for speech: HTML-like tags and emphasis markers removed.
pub fn strip_markup(text: &str) -> String {
    let re_tags = Regex::new(r"<[^>]+>").unwrap();
    let mut plain = re_tags.replace_all(text, "").into_owned();

    let re_emphasis = Regex::new(r"(\*\*|__)(.+?)(\*\*|__)").unwrap();
    plain = re_emphasis.replace_all(&plain, "$2").into_owned();

    let re_blank = Regex::new(r"\n{2,}").unwrap();
    re_blank.replace_all(plain.trim(), "\n").into_owned()
}
