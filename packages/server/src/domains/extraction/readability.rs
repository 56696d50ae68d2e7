//! Readability-style article detection.
//!
//! Paragraph-like elements are scored by their text (length, commas) and the
//! score is credited to their parent and, at half weight, their grandparent.
//! Class and id names nudge candidates up or down, link-heavy blocks are
//! penalised, and the best candidate plus its strong siblings form the
//! article. When that comes out shorter than [`DEFAULT_CHAR_THRESHOLD`]
//! characters the page is scored again without the unlikely-class filter;
//! if it is still too short the page is treated as having no article.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Minimum article length in characters
pub const DEFAULT_CHAR_THRESHOLD: usize = 500;

/// Paragraphs shorter than this do not vote
const MIN_PARAGRAPH_CHARS: usize = 25;

const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form"];

lazy_static! {
    static ref UNLIKELY: Regex = Regex::new(
        r"(?i)-ad-|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote"
    )
    .expect("static regex");
    static ref MAYBE_CANDIDATE: Regex =
        Regex::new(r"(?i)and|article|body|column|content|main|shadow").expect("static regex");
    static ref POSITIVE: Regex = Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story"
    )
    .expect("static regex");
    static ref NEGATIVE: Regex = Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|foot|footer|footnote|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget"
    )
    .expect("static regex");
    static ref TITLE_SEPARATOR: Regex =
        Regex::new(r" [|\-–—\\/>»:]{1,2} ").expect("static regex");
}

/// Detected article
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: Option<String>,
    /// Whitespace-normalised article text
    pub text: String,
}

/// Find the main article of a document, if it has one.
pub fn parse_article(document: &Html) -> Option<Article> {
    let long_enough = |text: &String| text.chars().count() >= DEFAULT_CHAR_THRESHOLD;
    let text = article_text(document, true)
        .filter(long_enough)
        .or_else(|| article_text(document, false).filter(long_enough))?;

    Some(Article {
        title: article_title(document),
        text,
    })
}

/// `og:title`, else a cleaned `<title>`.
pub fn article_title(document: &Html) -> Option<String> {
    let og_title = Selector::parse("meta").ok().and_then(|sel| {
        document
            .select(&sel)
            .filter(|m| {
                m.value()
                    .attr("property")
                    .is_some_and(|p| p.eq_ignore_ascii_case("og:title"))
            })
            .find_map(|m| non_empty(m.value().attr("content").unwrap_or_default()))
    });

    og_title.or_else(|| {
        let sel = Selector::parse("title").ok()?;
        let raw = document.select(&sel).next()?.text().collect::<String>();
        non_empty(&clean_title(&normalize_whitespace(&raw)))
    })
}

/// Drop a trailing site name ("Article Name | Site") when what remains
/// still reads like a title.
fn clean_title(title: &str) -> String {
    let Some(last) = TITLE_SEPARATOR.find_iter(title).last() else {
        return title.to_string();
    };

    let head = title[..last.start()].trim();
    if head.split_whitespace().count() >= 3 {
        head.to_string()
    } else {
        title.to_string()
    }
}

struct Candidate<'a> {
    element: ElementRef<'a>,
    score: f64,
}

fn article_text(document: &Html, strip_unlikely: bool) -> Option<String> {
    let paragraphs = Selector::parse("p, pre, td").ok()?;
    let mut candidates: HashMap<_, Candidate> = HashMap::new();

    for paragraph in document.select(&paragraphs) {
        if in_boilerplate(paragraph, strip_unlikely) {
            continue;
        }

        let text = visible_text(paragraph);
        let length = text.chars().count();
        if length < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let score = 1.0 + text.matches(',').count() as f64 + (length as f64 / 100.0).min(3.0);

        let parent = paragraph.parent().and_then(ElementRef::wrap);
        let grandparent = parent.and_then(|p| p.parent()).and_then(ElementRef::wrap);

        for (ancestor, weight) in [(parent, 1.0), (grandparent, 0.5)] {
            let Some(ancestor) = ancestor else { continue };
            candidates
                .entry(ancestor.id())
                .or_insert_with(|| Candidate {
                    element: ancestor,
                    score: initial_score(ancestor),
                })
                .score += score * weight;
        }
    }

    for candidate in candidates.values_mut() {
        candidate.score *= 1.0 - link_density(candidate.element);
    }

    let top = candidates
        .values()
        .max_by(|a, b| a.score.total_cmp(&b.score))?;

    let threshold = (top.score * 0.2).max(10.0);
    let mut parts = Vec::new();

    match top.element.parent() {
        Some(parent) => {
            for sibling in parent.children().filter_map(ElementRef::wrap) {
                let include = if sibling.id() == top.element.id() {
                    true
                } else if let Some(c) = candidates.get(&sibling.id()) {
                    c.score >= threshold
                } else {
                    is_strong_paragraph(sibling)
                };

                if include {
                    parts.push(normalize_whitespace(&visible_text(sibling)));
                }
            }
        }
        None => parts.push(normalize_whitespace(&visible_text(top.element))),
    }

    non_empty(&parts.join(" "))
}

/// Tag and class/id based starting score for a candidate container
fn initial_score(element: ElementRef) -> f64 {
    let tag_score = match element.value().name() {
        "div" | "article" | "main" | "section" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };
    tag_score + class_weight(element)
}

fn class_weight(element: ElementRef) -> f64 {
    let mut weight = 0.0;
    for name in [element.value().attr("class"), element.value().attr("id")]
        .into_iter()
        .flatten()
    {
        if NEGATIVE.is_match(name) {
            weight -= 25.0;
        }
        if POSITIVE.is_match(name) {
            weight += 25.0;
        }
    }
    weight
}

/// Inside navigation, page chrome, or (with `strip_unlikely`) a container
/// whose class/id marks it as unlikely content. The document root, `<body>`
/// and a `<form>` wrapping the whole page never count.
fn in_boilerplate(element: ElementRef, strip_unlikely: bool) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .filter(|el| !is_page_wrapper(*el))
        .any(|el| {
            let value = el.value();
            if BOILERPLATE_TAGS.contains(&value.name()) || NON_CONTENT_TAGS.contains(&value.name())
            {
                return true;
            }
            if !strip_unlikely {
                return false;
            }
            let names = format!(
                "{} {}",
                value.attr("class").unwrap_or_default(),
                value.attr("id").unwrap_or_default()
            );
            UNLIKELY.is_match(&names) && !MAYBE_CANDIDATE.is_match(&names)
        })
}

/// `<html>`, `<body>`, or a `<form>` sitting directly in `<body>` (ASP.NET
/// WebForms puts the whole page in one).
fn is_page_wrapper(element: ElementRef) -> bool {
    match element.value().name() {
        "html" | "body" => true,
        "form" => element
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| parent.value().name() == "body"),
        _ => false,
    }
}

/// A sibling paragraph worth keeping even though it was never scored
fn is_strong_paragraph(element: ElementRef) -> bool {
    if element.value().name() != "p" {
        return false;
    }
    let text = visible_text(element);
    let length = text.trim().chars().count();
    let density = link_density(element);

    (length > 80 && density < 0.25) || (length > 0 && density == 0.0 && text.contains(". "))
}

/// Share of an element's text that sits inside links
fn link_density(element: ElementRef) -> f64 {
    let total = visible_text(element).chars().count();
    if total == 0 {
        return 0.0;
    }

    let links = match Selector::parse("a") {
        Ok(sel) => element
            .select(&sel)
            .map(|a| visible_text(a).chars().count())
            .sum::<usize>(),
        Err(_) => 0,
    };

    links as f64 / total as f64
}

/// Text content without script, style and similar non-rendered subtrees.
pub fn visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !NON_CONTENT_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraph(seed: &str) -> String {
        format!(
            "<p>{}, which keeps going with more detail, numbers, and examples so the paragraph reads like real prose.</p>",
            seed
        )
    }

    fn article_page() -> String {
        let body: String = (0..6)
            .map(|i| long_paragraph(&format!("Paragraph {} explains the product range", i)))
            .collect();
        format!(
            r#"<html><head><title>Winter Boots for Hiking | Example Shop</title></head>
            <body>
              <nav><p>Home, Shop, About, Contact, Imprint, Privacy, Careers, Press</p></nav>
              <div class="sidebar"><p>Related products, offers, discounts and more, all in one place.</p></div>
              <div class="article-content">{}</div>
              <footer><p>Copyright, terms, conditions, and everything else at the bottom.</p></footer>
            </body></html>"#,
            body
        )
    }

    #[test]
    fn test_detects_article_and_skips_chrome() {
        let doc = Html::parse_document(&article_page());
        let article = parse_article(&doc).unwrap();

        assert!(article.text.contains("Paragraph 0 explains"));
        assert!(article.text.contains("Paragraph 5 explains"));
        assert!(!article.text.contains("Copyright"));
        assert!(!article.text.contains("Imprint"));
        assert_eq!(article.title.as_deref(), Some("Winter Boots for Hiking"));
    }

    fn entry_content() -> String {
        let body: String = (0..6)
            .map(|i| long_paragraph(&format!("Section {} covers shipping and returns", i)))
            .collect();
        format!(r#"<div class="entry-content">{}</div>"#, body)
    }

    #[test]
    fn test_body_classes_do_not_hide_the_article() {
        let html = format!(
            r#"<html><body class="post-template-default single has-sidebar header-fixed">
              <div class="site-menu"><p>Home, Shop, About, Contact, Imprint, Privacy, Careers, Press</p></div>
              {}
            </body></html>"#,
            entry_content()
        );
        let article = parse_article(&Html::parse_document(&html)).unwrap();

        assert!(article.text.contains("Section 0 covers"));
        assert!(article.text.contains("Section 5 covers"));
        assert!(!article.text.contains("Imprint"));
    }

    #[test]
    fn test_page_wrapping_form_does_not_hide_the_article() {
        let html = format!(
            r#"<html><body><form id="form1" method="post" action="./default.aspx">
              <div class="aspNetHidden"><input type="hidden" name="__VIEWSTATE" value="x"></div>
              {}
              <nav class="breadcrumbs"><p>Search the whole catalogue, all brands, every category.</p></nav>
            </form></body></html>"#,
            entry_content()
        );
        let article = parse_article(&Html::parse_document(&html)).unwrap();

        assert!(article.text.contains("Section 0 covers"));
        assert!(article.text.contains("Section 5 covers"));
        assert!(!article.text.contains("whole catalogue"));
    }

    #[test]
    fn test_unlikely_containers_are_rescored_when_nothing_else_is_long_enough() {
        let html = format!(
            r#"<html><body><div class="comment-area">{}</div></body></html>"#,
            entry_content()
        );
        let article = parse_article(&Html::parse_document(&html)).unwrap();

        assert!(article.text.contains("Section 3 covers"));
    }

    #[test]
    fn test_short_page_has_no_article() {
        let doc = Html::parse_document(
            "<html><body><p>Just one modest paragraph of text here.</p></body></html>",
        );
        assert!(parse_article(&doc).is_none());
    }

    #[test]
    fn test_og_title_wins_over_title_tag() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Shared Title"><title>Tag</title></head></html>"#,
        );
        assert_eq!(article_title(&doc).as_deref(), Some("Shared Title"));
    }

    #[test]
    fn test_clean_title_keeps_short_heads() {
        assert_eq!(clean_title("About | Shop"), "About | Shop");
        assert_eq!(
            clean_title("How we pick our suppliers - Example Shop"),
            "How we pick our suppliers"
        );
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let doc = Html::parse_document(
            "<html><body><div>Hello <script>var x = 1;</script>world</div></body></html>",
        );
        let sel = Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(visible_text(div), "Hello world");
    }
}
