//! Extraction domain - fetch a page and derive title, content, meta and H1

pub mod activities;
pub mod extractor;
pub mod models;
pub mod readability;

pub use activities::{scrape_batch, scrape_url, ScrapeOptions, ScrapeSummary};
pub use extractor::{extract_page, PageContent};
pub use models::ScrapeResult;
