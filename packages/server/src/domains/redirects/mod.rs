//! Redirects domain - chosen old -> new mappings and their export formats

pub mod export;
pub mod models;

pub use export::{render_export, ExportFormat};
pub use models::{MatchType, NewRedirect, Redirect, RedirectView};
