pub mod scraped_page;

pub use scraped_page::{SaveScrapedPageInput, ScrapedPage, ScrapedPageInput};
