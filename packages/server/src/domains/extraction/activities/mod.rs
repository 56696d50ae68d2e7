pub mod scrape;

pub use scrape::{scrape_batch, scrape_url, ScrapeOptions, ScrapeSummary};
