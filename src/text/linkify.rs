//! Auto-linking of Markdown links, email addresses and URLs.
//!
//! Three passes run in priority order: `[text](target)` spans, then bare
//! emails, then bare URLs and domains. Each pass only sees plain text that no
//! earlier pass turned into a link, and nothing inside tags or inside an
//! existing `<a>` element is ever rewritten.

use lazy_static::lazy_static;
use regex::Regex;

use super::{escape_attribute, split_tags, Segment};

/// URLs whose visible text is longer than this get shortened.
pub const URL_SHORTEN_THRESHOLD: usize = 30;
/// Hard cap on the visible length of a shortened URL.
pub const URL_DISPLAY_CAP: usize = 45;

lazy_static! {
    static ref RE_MARKDOWN_LINK: Regex =
        Regex::new(r"\[([^\[\]]+)\]\(([^()\s]+)\)").unwrap();

    static ref RE_EMAIL: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b").unwrap();

    static ref RE_URL: Regex = Regex::new(
        r"(?i)\b(?:https?://[^\s<>\x22]+|www\.[^\s<>\x22]+|[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|org|net|edu|gov|mil|int|io|co|info|biz|dev|app|me|ai)\b(?:/[^\s<>\x22]*)?)"
    )
    .unwrap();

    static ref RE_LINK_ELEMENT: Regex = Regex::new(r"(?s)<a\b[^<>]*>(.*?)</a>").unwrap();
}

/// Text being linkified: either still open to rewriting, or already final.
enum Piece {
    Open(String),
    Done(String),
}

/// Wrap Markdown links, emails and URLs in `<a href="…">` markup.
pub fn linkify(markup: &str) -> String {
    let mut pieces = freeze_markup(markup);
    pieces = apply_pass(pieces, link_markdown);
    pieces = apply_pass(pieces, link_emails);
    pieces = apply_pass(pieces, link_urls);

    let mut out = String::with_capacity(markup.len());
    for piece in pieces {
        match piece {
            Piece::Open(s) | Piece::Done(s) => out.push_str(&s),
        }
    }
    out
}

/// Replace every `<a …>text</a>` element by its inner text.
pub fn strip_links(markup: &str) -> String {
    RE_LINK_ELEMENT.replace_all(markup, "$1").into_owned()
}

/// Tags and everything inside an existing `<a>` element are final.
fn freeze_markup(markup: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut link_depth = 0usize;
    for segment in split_tags(markup) {
        match segment {
            Segment::Tag(tag) => {
                let lower = tag.to_ascii_lowercase();
                if lower.starts_with("<a ") || lower == "<a>" {
                    link_depth += 1;
                } else if lower == "</a>" || lower.starts_with("</a ") {
                    link_depth = link_depth.saturating_sub(1);
                }
                pieces.push(Piece::Done(tag.to_string()));
            }
            Segment::Text(text) if link_depth > 0 => pieces.push(Piece::Done(text.to_string())),
            Segment::Text(text) => pieces.push(Piece::Open(text.to_string())),
        }
    }
    pieces
}

fn apply_pass(pieces: Vec<Piece>, pass: fn(&str) -> Vec<Piece>) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Open(text) => out.extend(pass(&text)),
            done => out.push(done),
        }
    }
    out
}

fn link_markdown(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in RE_MARKDOWN_LINK.captures_iter(text) {
        let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        push_open(&mut pieces, &text[last..whole.start()]);
        pieces.push(Piece::Done(anchor(&link_target(target.as_str()), label.as_str())));
        last = whole.end();
    }
    push_open(&mut pieces, &text[last..]);
    pieces
}

fn link_emails(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in RE_EMAIL.find_iter(text) {
        push_open(&mut pieces, &text[last..m.start()]);
        pieces.push(Piece::Done(anchor(&format!("mailto:{}", m.as_str()), m.as_str())));
        last = m.end();
    }
    push_open(&mut pieces, &text[last..]);
    pieces
}

fn link_urls(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in RE_URL.find_iter(text) {
        let url = trim_trailing_punctuation(m.as_str());
        if url.is_empty() {
            continue;
        }
        push_open(&mut pieces, &text[last..m.start()]);
        pieces.push(Piece::Done(anchor(&link_target(url), &shorten_url(url))));
        // Trimmed punctuation goes back to the surrounding text.
        last = m.start() + url.len();
    }
    push_open(&mut pieces, &text[last..]);
    pieces
}

fn push_open(pieces: &mut Vec<Piece>, text: &str) {
    if !text.is_empty() {
        pieces.push(Piece::Open(text.to_string()));
    }
}

fn anchor(href: &str, visible: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_attribute(href), visible)
}

/// Sentence punctuation right after a URL belongs to the sentence. A closing
/// parenthesis stays when the URL opened one.
fn trim_trailing_punctuation(url: &str) -> &str {
    let mut end = url.len();
    while let Some(c) = url[..end].chars().last() {
        let strip = match c {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' => true,
            ')' => !url[..end].contains('('),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= c.len_utf8();
    }
    &url[..end]
}

/// Emails get `mailto:`, scheme-less URLs get `https://`.
fn link_target(target: &str) -> String {
    let lower = target.to_ascii_lowercase();
    if lower.contains("://") || lower.starts_with("mailto:") || lower.starts_with("tel:") {
        target.to_string()
    } else if RE_EMAIL.is_match(target) && !target.contains('/') {
        format!("mailto:{}", target)
    } else {
        format!("https://{}", target)
    }
}

/// Shorten the visible text of a long URL to `origin/.../last` (with `?...`
/// when it carries a query). Short URLs come back unchanged.
pub fn shorten_url(url: &str) -> String {
    if url.chars().count() <= URL_SHORTEN_THRESHOLD {
        return url.to_string();
    }

    let scheme_len = url.find("://").map(|i| i + 3).unwrap_or(0);
    let rest = &url[scheme_len..];
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let origin = &url[..scheme_len + host_end];
    let tail = &rest[host_end..];

    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    let has_query = tail[path_end..].starts_with('?');
    let segments: Vec<&str> = tail[..path_end].split('/').filter(|s| !s.is_empty()).collect();

    let mut short = match segments.as_slice() {
        [] => origin.to_string(),
        [only] => format!("{}/{}", origin, only),
        [.., last] => format!("{}/.../{}", origin, last),
    };
    if has_query {
        short.push_str("?...");
    }

    if short.chars().count() > URL_DISPLAY_CAP {
        let kept: String = short.chars().take(URL_DISPLAY_CAP - 3).collect();
        short = format!("{}...", kept);
    }
    short
}
