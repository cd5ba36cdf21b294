use regex::Regex;
use std::sync::OnceLock;

/// Markup-removal patterns, applied in a fixed order. Display-only; never
/// touches what gets embedded or stored.
struct StripPatterns {
    emphasis: Regex,
    headers: Regex,
    images: Regex,
    links: Regex,
    fenced_code: Regex,
    inline_code: Regex,
    list_markers: Regex,
    blockquotes: Regex,
    rules: Regex,
    strikethrough: Regex,
    wikilinks: Regex,
}

impl StripPatterns {
    fn new() -> Self {
        Self {
            emphasis: Regex::new(r"[*_]{1,2}([^*_]+)[*_]{1,2}").expect("emphasis pattern"),
            headers: Regex::new(r"#{1,6}\s*(.*)").expect("headers pattern"),
            images: Regex::new(r"!\[[^\[\]]*\]\([^()]*\)").expect("images pattern"),
            links: Regex::new(r"\[([^\[\]]+)\]\([^()]+\)").expect("links pattern"),
            fenced_code: Regex::new(r"`{3}[^`]*`{3}").expect("fenced code pattern"),
            inline_code: Regex::new(r"`([^`]+)`").expect("inline code pattern"),
            list_markers: Regex::new(r"(?m)^\s*[-*+]\s+(.*)").expect("list pattern"),
            blockquotes: Regex::new(r"(?m)^>\s+(.*)").expect("blockquote pattern"),
            rules: Regex::new(r"(?m)^-{3,}").expect("rule pattern"),
            strikethrough: Regex::new(r"~~([^~]+)~~").expect("strikethrough pattern"),
            wikilinks: Regex::new(r"\[\[([^\]]+)\]\]").expect("wikilink pattern"),
        }
    }
}

fn patterns() -> &'static StripPatterns {
    static PATTERNS: OnceLock<StripPatterns> = OnceLock::new();
    PATTERNS.get_or_init(StripPatterns::new)
}

/// Strips markdown markup from a snippet for display.
///
/// Images are removed entirely; links and wikilinks keep their label text;
/// fenced code blocks are dropped while inline code keeps its content.
pub fn strip(text: &str) -> String {
    let p = patterns();
    let text = p.emphasis.replace_all(text, "$1");
    let text = p.headers.replace_all(&text, "$1");
    let text = p.images.replace_all(&text, "");
    let text = p.links.replace_all(&text, "$1");
    let text = p.fenced_code.replace_all(&text, "");
    let text = p.inline_code.replace_all(&text, "$1");
    let text = p.list_markers.replace_all(&text, "$1");
    let text = p.blockquotes.replace_all(&text, "$1");
    let text = p.rules.replace_all(&text, "");
    let text = p.strikethrough.replace_all(&text, "$1");
    let text = p.wikilinks.replace_all(&text, "$1");
    text.into_owned()
}

/// Cuts `text` to at most `max_len` characters, appending an ellipsis
/// marker only when something was cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_len).collect();
    cut.push_str("...");
    cut
}
