//! Field extraction from a page's HTML.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::readability::{self, visible_text};

/// Below this the article text is not trusted as main content
pub const MIN_MAIN_CONTENT_CHARS: usize = 40;
const MAIN_ELEMENT_MIN_CHARS: usize = 80;
const PARAGRAPH_MIN_CHARS: usize = 40;
const BODY_MIN_CHARS: usize = 40;
const STYLED_HEADING_MIN_CHARS: usize = 10;

lazy_static! {
    static ref FONT_SIZE: Regex =
        Regex::new(r"(?i)font-size\s*:\s*([0-9]*\.?[0-9]+)\s*(px|pt|rem|em|%)?").expect("static regex");
}

/// The four fields stored per URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub title: Option<String>,
    pub main_content: Option<String>,
    pub meta_description: Option<String>,
    pub h1_heading: Option<String>,
}

pub fn extract_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);
    let article = readability::parse_article(&document);

    let title = article
        .as_ref()
        .and_then(|a| a.title.clone())
        .or_else(|| title_tag(&document));

    let main_content = article
        .map(|a| a.text)
        .filter(|text| text.chars().count() >= MIN_MAIN_CONTENT_CHARS)
        .or_else(|| fallback_main_content(&document));

    PageContent {
        title,
        main_content,
        meta_description: meta_description(&document),
        h1_heading: h1_heading(&document),
    }
}

fn title_tag(document: &Html) -> Option<String> {
    first_match(document, "title").and_then(|el| trimmed_text(el, 0))
}

/// `<main>`, then the longest paragraph, then the whole body.
fn fallback_main_content(document: &Html) -> Option<String> {
    if let Some(text) = first_match(document, "main").and_then(|el| trimmed_text(el, MAIN_ELEMENT_MIN_CHARS)) {
        return Some(text);
    }

    let longest_paragraph = Selector::parse("p").ok().and_then(|sel| {
        document
            .select(&sel)
            .filter_map(|p| trimmed_text(p, PARAGRAPH_MIN_CHARS))
            .fold(None, |best: Option<String>, text| match best {
                Some(b) if b.chars().count() >= text.chars().count() => Some(b),
                _ => Some(text),
            })
    });
    if longest_paragraph.is_some() {
        return longest_paragraph;
    }

    first_match(document, "body").and_then(|el| trimmed_text(el, BODY_MIN_CHARS))
}

/// `description` or `og:description`, else the first meta tag with content.
fn meta_description(document: &Html) -> Option<String> {
    let sel = Selector::parse("meta").ok()?;
    let metas: Vec<ElementRef> = document.select(&sel).collect();

    let content = |meta: &ElementRef| {
        meta.value()
            .attr("content")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    };

    metas
        .iter()
        .filter(|meta| {
            let attr_is = |name: &str, expected: &str| {
                meta.value()
                    .attr(name)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
            };
            attr_is("name", "description") || attr_is("property", "og:description")
        })
        .find_map(content)
        .or_else(|| metas.iter().find_map(content))
}

/// First `<h1>` with text, else the text of the element with the largest
/// inline font size.
fn h1_heading(document: &Html) -> Option<String> {
    let headings = Selector::parse("h1").ok()?;
    if let Some(text) = document.select(&headings).find_map(|el| trimmed_text(el, 0)) {
        return Some(text);
    }

    let sel = Selector::parse(r#"[style*="font-size"]"#).ok()?;
    let mut best: Option<(f64, String)> = None;

    for element in document.select(&sel) {
        let Some(text) = trimmed_text(element, STYLED_HEADING_MIN_CHARS) else {
            continue;
        };
        let size = element
            .value()
            .attr("style")
            .and_then(font_size_px)
            .unwrap_or(0.0);

        if best.as_ref().map_or(true, |(best_size, _)| size > *best_size) {
            best = Some((size, text));
        }
    }

    best.map(|(_, text)| text)
}

/// Inline `font-size` converted to CSS pixels; keywords yield `None`.
fn font_size_px(style: &str) -> Option<f64> {
    let caps = FONT_SIZE.captures(style)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let factor = match caps.get(2).map(|u| u.as_str().to_ascii_lowercase()).as_deref() {
        Some("pt") => 4.0 / 3.0,
        Some("em") | Some("rem") => 16.0,
        Some("%") => 0.16,
        _ => 1.0,
    };
    Some(value * factor)
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    document.select(&sel).next()
}

/// Trimmed visible text when it is longer than `min_chars` (any non-empty
/// text when `min_chars` is 0).
fn trimmed_text(element: ElementRef, min_chars: usize) -> Option<String> {
    let text = visible_text(element);
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length == 0 || (min_chars > 0 && length <= min_chars) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
