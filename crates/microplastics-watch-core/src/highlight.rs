//! Case-insensitive literal highlighting of a search term.
//!
//! The user's term is escaped before it is compiled, so regex
//! metacharacters (`.`, `*`, `(`, `[`, `\` …) always match themselves and
//! never yield an invalid pattern.
//!
//! ```
//! use microplastics_watch_core::highlight::{Highlighter, MarkStyle};
//!
//! let h = Highlighter::new("PFAS (total)").unwrap();
//! let html = h.render("Levels of pfas (TOTAL) rose.", MarkStyle::Html);
//! assert_eq!(html, "Levels of <mark>pfas (TOTAL)</mark> rose.");
//! ```

use std::ops::Range;

use regex::{Regex, RegexBuilder};

/// Output flavour for [`Highlighter::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkStyle {
    /// HTML-escaped text with `<mark>` around matches.
    Html,
    /// Raw text with ANSI reverse video around matches.
    Terminal,
    /// Raw text with `**` around matches, for piped output.
    Markdown,
}

impl MarkStyle {
    fn open(self) -> &'static str {
        match self {
            MarkStyle::Html => "<mark>",
            MarkStyle::Terminal => "\x1b[7m",
            MarkStyle::Markdown => "**",
        }
    }

    fn close(self) -> &'static str {
        match self {
            MarkStyle::Html => "</mark>",
            MarkStyle::Terminal => "\x1b[0m",
            MarkStyle::Markdown => "**",
        }
    }

    fn push_text(self, out: &mut String, text: &str) {
        match self {
            MarkStyle::Html => out.push_str(&html_escape::encode_text(text)),
            MarkStyle::Terminal | MarkStyle::Markdown => out.push_str(text),
        }
    }
}

/// A run of text that is either a match or the text between matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Compiled matcher for one search term.
#[derive(Debug, Clone)]
pub struct Highlighter {
    term: String,
    pattern: Regex,
}

impl Highlighter {
    /// Returns `None` when the term is blank.
    pub fn new(term: &str) -> Option<Self> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self {
            term: term.to_string(),
            pattern,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte ranges of every non-overlapping match, left to right.
    pub fn matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.pattern.find_iter(text).map(|m| m.range())
    }

    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    pub fn first_match(&self, text: &str) -> Option<Range<usize>> {
        self.pattern.find(text).map(|m| m.range())
    }

    /// Splits `text` on match boundaries. Concatenating the segments gives
    /// back `text`; empty segments are never produced.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for m in self.pattern.find_iter(text) {
            if m.start() > cursor {
                segments.push(Segment {
                    text: &text[cursor..m.start()],
                    highlighted: false,
                });
            }
            segments.push(Segment {
                text: m.as_str(),
                highlighted: true,
            });
            cursor = m.end();
        }
        if cursor < text.len() {
            segments.push(Segment {
                text: &text[cursor..],
                highlighted: false,
            });
        }
        segments
    }

    pub fn render(&self, text: &str, style: MarkStyle) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        for segment in self.segments(text) {
            if segment.highlighted {
                out.push_str(style.open());
                style.push_text(&mut out, segment.text);
                out.push_str(style.close());
            } else {
                style.push_text(&mut out, segment.text);
            }
        }
        out
    }
}

/// Renders `text` with `term` highlighted, or just escaped when the term is
/// blank.
pub fn highlight(text: &str, term: Option<&str>, style: MarkStyle) -> String {
    match term.and_then(Highlighter::new) {
        Some(h) => h.render(text, style),
        None => {
            let mut out = String::with_capacity(text.len());
            style.push_text(&mut out, text);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_term_has_no_highlighter() {
        assert!(Highlighter::new("").is_none());
        assert!(Highlighter::new("   ").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let h = Highlighter::new("microplastic").unwrap();
        let segs = h.segments("Microplastics and MICROPLASTIC debris");
        let hits: Vec<&str> = segs
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.text)
            .collect();
        assert_eq!(hits, vec!["Microplastic", "MICROPLASTIC"]);
    }

    #[test]
    fn test_metacharacters_match_literally() {
        for term in ["(a+b)*", "[", "\\", ".", "^$", "a|b", "?{}", "c++"] {
            let h = Highlighter::new(term).expect("escaped term must compile");
            let text = format!("before {} after", term.to_uppercase());
            assert_eq!(h.count(&text), 1, "term {:?}", term);
        }
    }

    #[test]
    fn test_dot_does_not_match_any_char() {
        let h = Highlighter::new("a.c").unwrap();
        assert!(!h.is_match("abc"));
        assert!(h.is_match("A.C"));
    }

    #[test]
    fn test_segments_reconstruct_text() {
        let h = Highlighter::new("nano").unwrap();
        let text = "nano-plastics: nanoparticles smaller than nano";
        let joined: String = h.segments(text).iter().map(|s| s.text).collect();
        assert_eq!(joined, text);
        assert!(h.segments(text).iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn test_render_html_escapes_surroundings() {
        let h = Highlighter::new("fish").unwrap();
        let html = h.render("<b>Fish</b> & chips", MarkStyle::Html);
        assert_eq!(html, "&lt;b&gt;<mark>Fish</mark>&lt;/b&gt; &amp; chips");
    }

    #[test]
    fn test_render_terminal() {
        let h = Highlighter::new("ocean").unwrap();
        let out = h.render("the Ocean", MarkStyle::Terminal);
        assert_eq!(out, "the \x1b[7mOcean\x1b[0m");
    }

    #[test]
    fn test_render_markdown() {
        let h = Highlighter::new("pfas").unwrap();
        assert_eq!(h.render("PFAS & co", MarkStyle::Markdown), "**PFAS** & co");
    }

    #[test]
    fn test_first_match() {
        let h = Highlighter::new("sea").unwrap();
        assert_eq!(h.first_match("deep SEA, shallow sea"), Some(5..8));
        assert_eq!(h.first_match("lake"), None);
    }

    #[test]
    fn test_highlight_without_term_only_escapes() {
        assert_eq!(highlight("a < b", None, MarkStyle::Html), "a &lt; b");
        assert_eq!(highlight("a < b", Some(" "), MarkStyle::Terminal), "a < b");
    }

    #[test]
    fn test_term_is_trimmed() {
        let h = Highlighter::new("  soil ").unwrap();
        assert_eq!(h.term(), "soil");
        assert!(h.is_match("Soil samples"));
    }
}
