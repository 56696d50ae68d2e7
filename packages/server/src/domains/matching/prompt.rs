//! Prompt for choosing a redirect target.

use std::fmt::Write;

use crate::domains::batches::UrlRecord;

/// Placeholder for fields extraction could not fill
const MISSING: &str = "-";

/// One prompt per old URL: the old page, then every candidate page numbered
/// from 1. Page text is cut to `content_chars` characters per page.
pub fn build_match_prompt(old: &UrlRecord, candidates: &[UrlRecord], content_chars: usize) -> String {
    let mut prompt = String::from(
        "You are an SEO expert planning 301 redirects for a website relaunch. \
         Find the page on the new site that best replaces the old page below. \
         Compare URL, title, meta description, H1 and main text.\n\n",
    );

    prompt.push_str("Old URL:\n");
    push_page(&mut prompt, old, content_chars);

    prompt.push_str("\nNew URLs:\n");
    let listed: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let mut block = format!("({})\n", i + 1);
            push_page(&mut block, candidate, content_chars);
            block
        })
        .collect();
    prompt.push_str(&listed.join("---\n"));

    prompt.push_str("\nAnswer with the URL of the single best matching new page and nothing else.");
    prompt
}

fn push_page(out: &mut String, page: &UrlRecord, content_chars: usize) {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(MISSING)
            .to_string()
    };
    let text = page
        .main_content
        .as_deref()
        .map(|c| truncate_chars(c.trim(), content_chars))
        .filter(|c| !c.is_empty())
        .unwrap_or(MISSING);

    // Writing into a String cannot fail
    let _ = writeln!(out, "URL: {}", page.url);
    let _ = writeln!(out, "Title: {}", field(&page.title));
    let _ = writeln!(out, "Meta: {}", field(&page.meta_description));
    let _ = writeln!(out, "H1: {}", field(&page.h1_heading));
    let _ = writeln!(out, "Text: {}", text);
}

/// First `max_chars` characters of `text`
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{BatchId, UrlRecordId};
    use crate::domains::batches::UrlType;
    use chrono::Utc;

    fn page(url: &str, url_type: UrlType, title: Option<&str>, content: Option<&str>) -> UrlRecord {
        UrlRecord {
            id: UrlRecordId::new(),
            batch_id: BatchId::new(),
            url: url.to_string(),
            url_type,
            order: 0,
            title: title.map(str::to_string),
            main_content: content.map(str::to_string),
            meta_description: None,
            h1_heading: None,
            status_code: Some(200),
            scrape_error: None,
            scraped_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_lists_old_page_and_numbered_candidates() {
        let old = page("https://old.com/boots", UrlType::Old, Some("Boots"), Some("Winter boots"));
        let candidates = vec![
            page("https://new.com/shoes", UrlType::New, Some("Shoes"), None),
            page("https://new.com/boots", UrlType::New, None, Some("All boots")),
        ];

        let prompt = build_match_prompt(&old, &candidates, 2000);

        assert!(prompt.contains("Old URL:\nURL: https://old.com/boots\nTitle: Boots"));
        assert!(prompt.contains("(1)\nURL: https://new.com/shoes"));
        assert!(prompt.contains("---\n(2)\nURL: https://new.com/boots\nTitle: -"));
        assert!(prompt.ends_with("and nothing else."));
    }

    #[test]
    fn test_content_is_truncated_per_page() {
        let long = "ä".repeat(50);
        let old = page("https://old.com/", UrlType::Old, None, Some(&long));

        let prompt = build_match_prompt(&old, &[], 10);

        assert!(prompt.contains(&format!("Text: {}\n", "ä".repeat(10))));
        assert!(!prompt.contains(&"ä".repeat(11)));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("日本語", 1), "日");
    }
}
