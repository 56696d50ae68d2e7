use serde::{Deserialize, Serialize};

use super::extractor::PageContent;
use crate::domains::batches::UrlContentUpdate;

/// Extraction result for one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    /// HTTP status; 0 when no response was received
    pub status: u16,
    pub title: Option<String>,
    pub main_content: Option<String>,
    pub meta_description: Option<String>,
    pub h1_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn from_page(url: &str, status: u16, content: PageContent) -> Self {
        Self {
            url: url.to_string(),
            status,
            title: content.title,
            main_content: content.main_content,
            meta_description: content.meta_description,
            h1_heading: content.h1_heading,
            error: None,
        }
    }

    /// All fields empty, status 0, and the error tagged with the URL
    pub fn failed(url: &str, message: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            status: 0,
            title: None,
            main_content: None,
            meta_description: None,
            h1_heading: None,
            error: Some(format!("[Scrape Error] {} | {}", url, message)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ScrapeResult> for UrlContentUpdate {
    fn from(result: ScrapeResult) -> Self {
        Self {
            title: result.title,
            main_content: result.main_content,
            meta_description: result.meta_description,
            h1_heading: result.h1_heading,
            status_code: Some(i32::from(result.status)),
            scrape_error: result.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_shape() {
        let result = ScrapeResult::failed("https://a.com/x", "connection refused");

        assert_eq!(result.status, 0);
        assert!(result.title.is_none() && result.main_content.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("[Scrape Error] https://a.com/x | connection refused")
        );

        let update = UrlContentUpdate::from(result);
        assert_eq!(update.status_code, Some(0));
        assert!(update.scrape_error.is_some());
    }

    #[test]
    fn test_error_field_omitted_on_success() {
        let result = ScrapeResult::from_page("https://a.com/", 200, PageContent::default());
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("error").is_none());
        assert_eq!(json["status"], 200);
        assert!(json["title"].is_null());
    }
}
