// HTTP routes
pub mod batches;
pub mod health;
pub mod matching;
pub mod redirects;
pub mod scrape;
pub mod scraped_pages;
pub mod urls;

pub use batches::*;
pub use health::*;
pub use matching::*;
pub use redirects::*;
pub use scrape::*;
pub use scraped_pages::*;
pub use urls::*;
