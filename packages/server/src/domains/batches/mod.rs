//! Batches domain - a named job holding an old and a new URL list

pub mod data;
pub mod models;
pub mod url_list;

pub use data::{CreateBatchInput, NewBatch, ValidationError};
pub use models::{Batch, NewUrlRecord, UrlContentUpdate, UrlRecord, UrlType};
pub use url_list::{is_valid_url, parse_url_list, read_url_file};
