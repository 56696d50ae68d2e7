//! Scraped pages - scrape results supplied by an external scraper

pub mod models;

pub use models::{SaveScrapedPageInput, ScrapedPage, ScrapedPageInput};
