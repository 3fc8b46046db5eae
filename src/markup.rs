//! HTML output helpers
//!
//! The alignment result is server-provided markup. Whether it is trusted is a
//! deliberate choice made through [`MarkupPolicy`].

/// How server-provided result text is placed into the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkupPolicy {
    /// Escape the text so any tags show up literally.
    #[default]
    Escaped,
    /// Inject the text as-is. Only for a trusted workflow backend.
    Raw,
}

impl MarkupPolicy {
    pub fn apply(self, text: &str) -> String {
        match self {
            MarkupPolicy::Escaped => escape_html(text),
            MarkupPolicy::Raw => text.to_string(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
