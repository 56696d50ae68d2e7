//! Match activity: one completion per old URL, sequentially.

use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::common::BatchId;
use crate::config::{PipelineConfig, RematchMode};
use crate::domains::batches::UrlType;
use crate::domains::matching::prompt::build_match_prompt;
use crate::domains::matching::response::pick_candidate;
use crate::domains::redirects::{MatchType, NewRedirect};
use crate::kernel::ServerDeps;

/// Fixed score for model-chosen redirects; the model is not asked for one
const AI_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub matched: usize,
    /// The answer named none of the candidates
    pub unmatched: usize,
    /// Completion or store errors
    pub failed: usize,
    /// Old URLs not attempted because the run was cancelled
    pub pending: usize,
    pub cancelled: bool,
}

pub async fn match_batch(
    batch_id: BatchId,
    config: &PipelineConfig,
    token: &CancellationToken,
    deps: &ServerDeps,
) -> Result<MatchSummary> {
    let old_urls = deps.repo.list_urls(batch_id, Some(UrlType::Old)).await?;
    let candidates = deps.repo.list_urls(batch_id, Some(UrlType::New)).await?;

    if config.rematch_mode == RematchMode::Replace {
        let removed = deps.repo.delete_redirects(batch_id).await?;
        info!(batch_id = %batch_id, removed, "Cleared previous redirects");
    }

    let mut summary = MatchSummary::default();

    if candidates.is_empty() {
        warn!(batch_id = %batch_id, "Batch has no new URLs to match against");
        summary.unmatched = old_urls.len();
        return Ok(summary);
    }

    info!(
        batch_id = %batch_id,
        old_urls = old_urls.len(),
        candidates = candidates.len(),
        "Matching batch"
    );

    for (index, old) in old_urls.iter().enumerate() {
        if token.is_cancelled() {
            summary.cancelled = true;
            summary.pending = old_urls.len() - index;
            break;
        }

        let prompt = build_match_prompt(old, &candidates, config.prompt_content_chars);
        let answer = match deps.ai.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(old_url = %old.url, error = %e, "Completion failed");
                summary.failed += 1;
                continue;
            }
        };

        let Some(target) = pick_candidate(&answer, &candidates) else {
            warn!(old_url = %old.url, answer = %answer.trim(), "No candidate URL in answer");
            summary.unmatched += 1;
            continue;
        };

        let redirect = NewRedirect {
            batch_id,
            old_url_id: old.id,
            new_url_id: target.id,
            confidence_score: AI_CONFIDENCE,
            match_type: MatchType::Ai,
            match_reasoning: Some(answer.trim().to_string()),
        };

        match deps.repo.insert_redirect(&redirect).await {
            Ok(_) => {
                debug!(old_url = %old.url, new_url = %target.url, "Matched");
                summary.matched += 1;
            }
            Err(e) => {
                error!(old_url = %old.url, error = %e, "Failed to store redirect");
                summary.failed += 1;
            }
        }
    }

    info!(
        batch_id = %batch_id,
        matched = summary.matched,
        unmatched = summary.unmatched,
        failed = summary.failed,
        cancelled = summary.cancelled,
        "Batch matching finished"
    );

    Ok(summary)
}
