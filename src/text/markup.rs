//! Rich-text markup to styled runs.
//!
//! Values may carry a small subset of HTML: inline emphasis, links, line
//! breaks and block elements. Each supported tag pushes a style onto a stack;
//! text between tags becomes a run with the combined style. Unknown tags are
//! dropped and their text kept. Whitespace collapses the way a browser would
//! collapse it, and block boundaries become newlines.

use lazy_static::lazy_static;
use regex::Regex;

use super::{split_tags, unescape_html, Segment};
use crate::description::TextRun;
use crate::style::{palette, Style, TextDecoration, VerticalShift};

const SMALL_FONT_SIZE: f64 = 8.0;
const BIG_FONT_SIZE: f64 = 12.0;

lazy_static! {
    static ref RE_TAG_NAME: Regex = Regex::new(r"^</?([a-zA-Z][a-zA-Z0-9]*)").unwrap();
    static ref RE_HREF: Regex =
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

struct Frame {
    tag: String,
    style: Style,
    href: Option<String>,
}

/// Parse markup into styled runs. Adjacent runs with the same style and link
/// target are merged.
pub fn parse_markup(markup: &str) -> Vec<TextRun> {
    let mut parser = Parser::default();
    for segment in split_tags(markup) {
        match segment {
            Segment::Text(text) => parser.text(text),
            Segment::Tag(tag) => parser.tag(tag),
        }
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    stack: Vec<Frame>,
    runs: Vec<TextRun>,
}

impl Parser {
    fn tag(&mut self, tag: &str) {
        let Some(name) = RE_TAG_NAME.captures(tag).map(|c| c[1].to_ascii_lowercase()) else {
            return;
        };
        let closing = tag.starts_with("</");
        let self_closing = tag.ends_with("/>");

        match name.as_str() {
            "br" => self.push_raw("\n"),
            "p" | "div" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.block_break(),
            "li" if !closing => {
                self.block_break();
                self.push_raw("• ");
            }
            _ => {}
        }

        if closing {
            if let Some(pos) = self.stack.iter().rposition(|f| f.tag == name) {
                self.stack.truncate(pos);
            }
            return;
        }
        if self_closing {
            return;
        }
        if let Some((style, href)) = inline_style(&name, tag) {
            self.stack.push(Frame { tag: name, style, href });
        }
    }

    fn text(&mut self, text: &str) {
        let mut collapsed = String::with_capacity(text.len());
        let mut in_space = self.at_line_start() || self.ends_with_space();
        for c in text.chars() {
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                if !in_space {
                    collapsed.push(' ');
                    in_space = true;
                }
            } else {
                collapsed.push(c);
                in_space = false;
            }
        }
        if !collapsed.is_empty() {
            self.push(&collapsed);
        }
    }

    /// Newline unless already at the start of a line.
    fn block_break(&mut self) {
        if !self.at_line_start() {
            self.push_raw("\n");
        }
    }

    fn push_raw(&mut self, text: &str) {
        if text.starts_with('\n') {
            self.trim_trailing_space();
        }
        self.push(text);
    }

    fn push(&mut self, text: &str) {
        let (style, href) = self.current();
        match self.runs.last_mut() {
            Some(last) if last.style == style && last.href == href => last.content.push_str(text),
            _ => self.runs.push(TextRun {
                content: text.to_string(),
                style,
                href,
            }),
        }
    }

    fn current(&self) -> (Style, Option<String>) {
        let mut style = Style::default();
        let mut href = None;
        for frame in &self.stack {
            merge_into(&mut style, &frame.style);
            if frame.href.is_some() {
                href = frame.href.clone();
            }
        }
        (style, href)
    }

    fn at_line_start(&self) -> bool {
        self.runs
            .iter()
            .rev()
            .find(|r| !r.content.is_empty())
            .map_or(true, |r| r.content.ends_with('\n'))
    }

    fn ends_with_space(&self) -> bool {
        self.runs.last().is_some_and(|r| r.content.ends_with(' '))
    }

    fn trim_trailing_space(&mut self) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.content.trim_end_matches(' ').len();
            last.content.truncate(trimmed);
            if last.content.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
    }

    fn finish(mut self) -> Vec<TextRun> {
        self.trim_trailing_space();
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.content.trim_end_matches(['\n', ' ']).len();
            last.content.truncate(trimmed);
            if last.content.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
        self.runs
    }
}

/// The style an inline tag contributes, or `None` for tags that carry none.
fn inline_style(name: &str, tag: &str) -> Option<(Style, Option<String>)> {
    let style = match name {
        "b" | "strong" => Style {
            bold: Some(true),
            ..Default::default()
        },
        "i" | "em" => Style {
            italics: Some(true),
            ..Default::default()
        },
        "u" | "ins" => Style {
            decoration: Some(TextDecoration::Underline),
            ..Default::default()
        },
        "s" | "strike" | "del" => Style {
            decoration: Some(TextDecoration::LineThrough),
            ..Default::default()
        },
        "sub" => Style {
            shift: Some(VerticalShift::Sub),
            ..Default::default()
        },
        "sup" => Style {
            shift: Some(VerticalShift::Sup),
            ..Default::default()
        },
        "small" => Style {
            font_size: Some(SMALL_FONT_SIZE),
            ..Default::default()
        },
        "big" => Style {
            font_size: Some(BIG_FONT_SIZE),
            ..Default::default()
        },
        "a" => {
            let href = RE_HREF.captures(tag).and_then(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .map(|m| unescape_html(m.as_str()))
            });
            let style = Style {
                color: Some(palette::LINK),
                decoration: Some(TextDecoration::Underline),
                ..Default::default()
            };
            return Some((style, href.filter(|h| !h.is_empty())));
        }
        _ => return None,
    };
    Some((style, None))
}

/// Layer `over` on top of `base`: set properties win.
fn merge_into(base: &mut Style, over: &Style) {
    if over.bold.is_some() {
        base.bold = over.bold;
    }
    if over.italics.is_some() {
        base.italics = over.italics;
    }
    if over.decoration.is_some() {
        base.decoration = over.decoration;
    }
    if over.shift.is_some() {
        base.shift = over.shift;
    }
    if over.font_size.is_some() {
        base.font_size = over.font_size;
    }
    if over.color.is_some() {
        base.color = over.color;
    }
}
