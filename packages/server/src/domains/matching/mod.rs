//! Matching domain - ask the language model which new URL replaces an old one

pub mod activities;
pub mod prompt;
pub mod response;

pub use activities::{match_batch, MatchSummary};
pub use prompt::build_match_prompt;
pub use response::pick_candidate;
