//! Markup helpers: selector compilation, number parsing, escaping, and the
//! serializer used to emit rendered card clones.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, UiError};

/// Elements that never carry a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub const RANK_BADGE_CLASS: &str = "rank-badge";
pub const SIMILARITY_FILL_CLASS: &str = "similarity-fill";

/// Compile a CSS selector, mapping parse failures into [`UiError`].
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| UiError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("float prefix pattern is valid")
    })
}

/// Parse the leading number of `raw`, the way browsers' `parseFloat` does.
///
/// Leading whitespace is skipped and trailing garbage ignored. Returns
/// `None` when no number is present.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    float_prefix()
        .find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Width style for a similarity bar: `round(score * 100)%`.
pub fn similarity_width(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Emit a clone of a card's markup with the first descendant rank badge
/// rewritten to `rank_label` and every similarity bar sized from its own
/// `data-score`.
pub fn clone_card(markup: &str, rank_label: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len() + 64);
    let mut writer = CloneWriter {
        out: &mut out,
        rank_label,
        badge_written: false,
    };
    for child in fragment.root_element().children() {
        if let Some(element) = ElementRef::wrap(child) {
            writer.element(element, true);
        } else if let Some(text) = child.value().as_text() {
            writer.out.push_str(&escape_text(text));
        }
    }
    out
}

struct CloneWriter<'a> {
    out: &'a mut String,
    rank_label: &'a str,
    badge_written: bool,
}

impl CloneWriter<'_> {
    fn element(&mut self, element: ElementRef<'_>, is_root: bool) {
        let name = element.value().name();
        let is_badge = !is_root && !self.badge_written && has_class(&element, RANK_BADGE_CLASS);
        let is_fill = has_class(&element, SIMILARITY_FILL_CLASS);

        self.out.push('<');
        self.out.push_str(name);
        let mut style_written = false;
        for (attr, value) in element.value().attrs() {
            if is_fill && attr == "style" {
                let mut style = super::parse_style(value);
                style.insert("width".to_string(), bar_width(&element));
                self.push_attr(attr, &render_style(&style));
                style_written = true;
            } else {
                self.push_attr(attr, value);
            }
        }
        if is_fill && !style_written {
            let width = format!("width: {}", bar_width(&element));
            self.push_attr("style", &width);
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        if is_badge {
            self.badge_written = true;
            self.out.push_str(&escape_text(self.rank_label));
        } else {
            for child in element.children() {
                if let Some(child_element) = ElementRef::wrap(child) {
                    self.element(child_element, false);
                } else if let Some(text) = child.value().as_text() {
                    if matches!(name, "script" | "style") {
                        self.out.push_str(text);
                    } else {
                        self.out.push_str(&escape_text(text));
                    }
                } else if let Some(comment) = child.value().as_comment() {
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->");
                }
            }
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attr(value));
        self.out.push('"');
    }
}

fn bar_width(element: &ElementRef<'_>) -> String {
    let score = element
        .value()
        .attr("data-score")
        .and_then(parse_float_prefix)
        .unwrap_or(0.0);
    similarity_width(score)
}

fn render_style(style: &std::collections::BTreeMap<String, String>) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}
