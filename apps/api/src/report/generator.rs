//! Report Requester — sends the built prompt to the completion provider.
//!
//! Flow: build_prompt → two-message conversation → ChatCompleter::complete →
//!       trimmed text or a failure description.
//!
//! All provider errors are folded into `ReportResult::Failure`; nothing here panics.

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::prompts::ASSISTANT_SYSTEM;
use crate::llm_client::{ChatCompleter, ChatMessage, ModelId};
use crate::report::outline::Outline;
use crate::report::prompts::build_prompt;

/// Response length cap for a single report.
pub const REPORT_MAX_TOKENS: u32 = 2000;

/// Everything needed for one generation attempt. Built once per request.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub source_text: String,
    pub outline: Outline,
    pub custom_instructions: String,
    pub model: ModelId,
}

/// Outcome of one report-generation attempt: the text or the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum ReportResult {
    Text(String),
    Failure(String),
}

/// Runs one report generation against `completer`.
pub async fn generate_report(
    completer: &dyn ChatCompleter,
    request: &ReportRequest,
) -> ReportResult {
    let prompt = build_prompt(
        &request.source_text,
        &request.outline,
        &request.custom_instructions,
    );
    let messages = [ChatMessage::system(ASSISTANT_SYSTEM), ChatMessage::user(prompt)];

    info!(
        "Requesting report: model={} ({}), sections={}, target_words={}",
        request.model,
        request.model.label(),
        request.outline.len(),
        request.outline.total_words()
    );

    match completer
        .complete(request.model, &messages, REPORT_MAX_TOKENS)
        .await
    {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                warn!("Completion provider returned blank report text");
                ReportResult::Failure("LLM returned empty content".to_string())
            } else {
                ReportResult::Text(text.to_string())
            }
        }
        Err(e) => {
            warn!("Report generation failed: {e}");
            ReportResult::Failure(e.to_string())
        }
    }
}
