// Redirect mapper - API core
//
// Builds 301 redirect maps for website relaunches: old and new URL lists go
// in, pages are scraped, a language model picks the best new page for every
// old one, and the mapping comes out as .htaccess, nginx or CSV.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod pipeline;
pub mod server;

pub use config::*;
pub use pipeline::{BatchNotFound, RedirectPipeline};
