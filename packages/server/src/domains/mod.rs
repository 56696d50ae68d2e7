// Business domains
pub mod batches;
pub mod extraction;
pub mod matching;
pub mod redirects;
pub mod scraped_pages;
