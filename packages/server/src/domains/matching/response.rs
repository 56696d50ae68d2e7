//! Reading the model's answer.

use crate::domains::batches::UrlRecord;

/// First candidate, in candidate order, whose URL appears anywhere in the
/// answer. A candidate that is a prefix of another (`/shoes` vs
/// `/shoes-sale`) wins whenever it comes first in the list.
pub fn pick_candidate<'a>(answer: &str, candidates: &'a [UrlRecord]) -> Option<&'a UrlRecord> {
    candidates
        .iter()
        .find(|candidate| !candidate.url.is_empty() && answer.contains(&candidate.url))
}
