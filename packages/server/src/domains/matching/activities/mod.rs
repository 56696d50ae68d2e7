pub mod match_batch;

pub use match_batch::{match_batch, MatchSummary};
