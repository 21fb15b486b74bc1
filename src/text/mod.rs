//! # Text Processing
//!
//! Everything that happens to a submitted value between the record and the
//! styled runs in a cell: entity unescaping, linkification, break
//! opportunities for long tokens, date and number formatting, and parsing
//! the limited rich-text markup values may carry.
//!
//! The pipeline works on markup strings. Tags are never touched by the text
//! passes; [`split_tags`] is the shared tokenizer that keeps them apart.

mod linkify;
mod markup;

pub use linkify::{linkify, shorten_url, strip_links};
pub use markup::parse_markup;

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Zero-width space: an invisible break opportunity.
pub const ZWSP: char = '\u{200B}';

/// Runs of at least this many non-space characters get break opportunities.
pub const WORD_BREAK_THRESHOLD: usize = 35;

lazy_static! {
    /// A markup tag. A lone `<` that does not open a tag is text.
    static ref RE_TAG: Regex =
        Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^<>]*)?/?>").unwrap();

    static ref RE_ENTITY: Regex =
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap();

    static ref RE_LONG_WORD: Regex =
        Regex::new(&format!(r"[^\s<>]{{{},}}", WORD_BREAK_THRESHOLD)).unwrap();

    static ref RE_ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap();
}

/// A piece of a markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Tag(&'a str),
    Text(&'a str),
}

/// Split markup into tags and the text between them, in order. Empty text
/// segments are skipped.
pub fn split_tags(markup: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in RE_TAG.find_iter(markup) {
        if m.start() > last {
            segments.push(Segment::Text(&markup[last..m.start()]));
        }
        segments.push(Segment::Tag(m.as_str()));
        last = m.end();
    }
    if last < markup.len() {
        segments.push(Segment::Text(&markup[last..]));
    }
    segments
}

/// Decode HTML entity references. Values are stored escaped, so markup like
/// `&lt;b&gt;` has to come back as `<b>` before it can be parsed. Unknown
/// entities are left as written.
pub fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    RE_ENTITY
        .replace_all(input, |caps: &Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(name)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "hellip" => Some('…'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "laquo" => Some('«'),
        "raquo" => Some('»'),
        _ => None,
    }
}

/// Escape text for use inside a double-quoted attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Put a zero-width space between every character of each run of
/// [`WORD_BREAK_THRESHOLD`] or more non-space characters, so the layout
/// engine can wrap tokens like long URLs or IDs instead of overflowing the
/// column. Tags are left intact.
pub fn break_long_words(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    for segment in split_tags(markup) {
        match segment {
            Segment::Tag(tag) => out.push_str(tag),
            Segment::Text(text) => {
                let broken = RE_LONG_WORD.replace_all(text, |caps: &Captures| {
                    let mut word = String::with_capacity(caps[0].len() * 4);
                    for (i, c) in caps[0].chars().enumerate() {
                        if i > 0 {
                            word.push(ZWSP);
                        }
                        word.push(c);
                    }
                    word
                });
                out.push_str(&broken);
            }
        }
    }
    out
}

/// Reformat an ISO date (`YYYY-MM-DD`, optionally followed by a time) as
/// `DD/MM/YYYY`. Timestamps with an offset are converted to UTC first.
/// Anything else comes back unchanged.
pub fn format_date(value: &str) -> String {
    if !RE_ISO_DATE.is_match(value) {
        return value.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).format("%d/%m/%Y").to_string();
    }
    match value.get(..10).map(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d")) {
        Some(Ok(date)) => date.format("%d/%m/%Y").to_string(),
        _ => value.to_string(),
    }
}

/// Render a JSON number. Integral values never show a decimal part.
pub fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Convert newlines to explicit line breaks.
pub fn newlines_to_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        let segments = split_tags("a <b>bold</b> < c");
        assert_eq!(
            segments,
            vec![
                Segment::Text("a "),
                Segment::Tag("<b>"),
                Segment::Text("bold"),
                Segment::Tag("</b>"),
                Segment::Text(" < c"),
            ]
        );
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("&lt;b&gt;hi&lt;/b&gt;"), "<b>hi</b>");
        assert_eq!(unescape_html("Tom &amp; Jerry &#39;&#x41;&#39;"), "Tom & Jerry 'A'");
        assert_eq!(unescape_html("&bogus; stays"), "&bogus; stays");
        assert_eq!(unescape_html("no entities"), "no entities");
    }

    #[test]
    fn test_break_long_words_only_long_runs() {
        let long = "a".repeat(WORD_BREAK_THRESHOLD);
        let out = break_long_words(&format!("short {}", long));
        assert!(out.starts_with("short a\u{200B}a"));
        assert_eq!(out.chars().filter(|&c| c == ZWSP).count(), WORD_BREAK_THRESHOLD - 1);

        let just_under = "b".repeat(WORD_BREAK_THRESHOLD - 1);
        assert_eq!(break_long_words(&just_under), just_under);
    }

    #[test]
    fn test_break_long_words_leaves_tags_alone() {
        let href = format!("https://example.com/{}", "x".repeat(40));
        let markup = format!("<a href=\"{}\">go</a>", href);
        assert_eq!(break_long_words(&markup), markup);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05"), "05/03/2024");
        assert_eq!(format_date("2024-03-05T23:30:00-05:00"), "06/03/2024");
        assert_eq!(format_date("2024-03-05T10:00:00"), "05/03/2024");
        assert_eq!(format_date("2024-13-45"), "2024-13-45");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_date_ignores_non_ascii_digits() {
        let arabic = "\u{0662}\u{0660}\u{0662}\u{0664}-\u{0660}\u{0663}-\u{0660}\u{0665}";
        assert_eq!(format_date(arabic), arabic);
        assert_eq!(format_date("2024-03-0\u{0665}"), "2024-03-0\u{0665}");
    }

    #[test]
    fn test_format_number() {
        let n = |v: serde_json::Value| match v {
            serde_json::Value::Number(n) => n,
            other => panic!("not a number: {}", other),
        };
        assert_eq!(format_number(&n(serde_json::json!(42))), "42");
        assert_eq!(format_number(&n(serde_json::json!(3.0))), "3");
        assert_eq!(format_number(&n(serde_json::json!(2.5))), "2.5");
    }

    #[test]
    fn test_newlines_to_breaks() {
        assert_eq!(newlines_to_breaks("a\r\nb\nc"), "a<br>b<br>c");
    }
}
