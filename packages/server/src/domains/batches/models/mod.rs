pub mod batch;
pub mod url_record;

pub use batch::Batch;
pub use url_record::{NewUrlRecord, UnknownUrlType, UrlContentUpdate, UrlRecord, UrlType};
