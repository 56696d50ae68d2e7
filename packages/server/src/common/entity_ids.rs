//! Typed ids for the persisted entities.

pub use super::id::Id;

/// Marker for a redirect-mapping batch.
pub struct Batch;

/// Marker for a row of the `urls` table.
pub struct UrlRecord;

/// Marker for a chosen redirect.
pub struct Redirect;

/// Marker for an externally saved scrape result.
pub struct ScrapedPage;

pub type BatchId = Id<Batch>;
pub type UrlRecordId = Id<UrlRecord>;
pub type RedirectId = Id<Redirect>;
pub type ScrapedPageId = Id<ScrapedPage>;
