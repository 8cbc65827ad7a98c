//! Token-then-search remote sequence.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{FindingResult, Selection},
    remote::{RawOutcome, SearchExecutor, TokenProvider},
};

const STATUS_SUCCESS: &str = "success";
const STATUS_NOT_FOUND: &str = "false";

/// Failures of the remote calls. Each is terminal for one invocation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The token request failed; no search was submitted.
    #[error("failed to acquire token: {0:#}")]
    Token(anyhow::Error),
    /// The search request failed.
    #[error("failed to find Falcone: {0:#}")]
    Find(anyhow::Error),
}

/// Acquires a fresh token and submits the selections under it.
///
/// Calls are strictly sequential and never retried. Callers that want a
/// deadline wrap [`SearchWorkflow::run`] in their own timeout.
#[derive(Clone)]
pub struct SearchWorkflow {
    tokens: Arc<dyn TokenProvider>,
    executor: Arc<dyn SearchExecutor>,
}

impl SearchWorkflow {
    /// Build a workflow from its two collaborators.
    pub fn new(tokens: Arc<dyn TokenProvider>, executor: Arc<dyn SearchExecutor>) -> Self {
        Self { tokens, executor }
    }

    /// Run the sequence for a complete set of selections.
    pub async fn run(&self, selections: &[Selection]) -> Result<FindingResult, WorkflowError> {
        let token = self.tokens.acquire().await.map_err(|err| {
            warn!(?err, "Token request failed");
            WorkflowError::Token(err)
        })?;

        let raw = self
            .executor
            .execute(&token, selections)
            .await
            .map_err(|err| {
                warn!(?err, "Search request failed");
                WorkflowError::Find(err)
            })?;

        let result = map_outcome(raw);
        info!(
            status = %result.status,
            destination = result.destination_name.as_deref().unwrap_or("-"),
            "Search resolved"
        );
        Ok(result)
    }
}

/// Map a raw service answer onto the tri-state result.
pub fn map_outcome(raw: RawOutcome) -> FindingResult {
    match raw.status.as_deref().map(str::trim) {
        Some(status) if status.eq_ignore_ascii_case(STATUS_SUCCESS) => match raw.destination_name {
            Some(name) if !name.trim().is_empty() => FindingResult::success(name),
            _ => FindingResult::error("search succeeded without naming a destination"),
        },
        Some(status) if status.eq_ignore_ascii_case(STATUS_NOT_FOUND) => FindingResult::not_found(),
        Some(other) => FindingResult::error(
            raw.error
                .unwrap_or_else(|| format!("unrecognized search status '{other}'")),
        ),
        None => FindingResult::error(
            raw.error
                .unwrap_or_else(|| "search response carried no status".to_string()),
        ),
    }
}
