//! In-process store of completed analyses
//!
//! Results are keyed by the exact request text; running the same text again
//! replaces the earlier result. Every completed run is also appended to an
//! ordered history. Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub request: String,
    pub timestamp: DateTime<Utc>,
    pub result_text: String,
}

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Ticker-looking word from the request, if any
    pub ticker_hint: Option<String>,
    pub request: String,
    pub result: String,
}

/// Results keyed by request text, plus an append-only history
#[derive(Debug, Default)]
pub struct ResultStore {
    results: HashMap<String, AnalysisResult>,
    history: Vec<HistoryEntry>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result_text` under `request`, replacing any earlier result
    pub fn record(&mut self, request: &str, result_text: impl Into<String>) -> &AnalysisResult {
        let result = AnalysisResult {
            request: request.to_string(),
            timestamp: Utc::now(),
            result_text: result_text.into(),
        };

        self.history.push(HistoryEntry {
            timestamp: result.timestamp,
            ticker_hint: ticker_hint(request),
            request: request.to_string(),
            result: result.result_text.clone(),
        });

        let replaced = self.results.insert(request.to_string(), result).is_some();
        debug!(request, replaced, stored = self.results.len(), "Recorded analysis result");
        &self.results[request]
    }

    /// Result for exactly this request text
    pub fn get(&self, request: &str) -> Option<&AnalysisResult> {
        self.results.get(request)
    }

    /// Every completed run, oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Number of distinct requests stored
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// First word of two to five capital letters, e.g. `MSFT` in "Should I buy MSFT?"
pub fn ticker_hint(request: &str) -> Option<String> {
    request
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find(|word| (2..=5).contains(&word.len()) && word.chars().all(|c| c.is_ascii_uppercase()))
        .map(ToString::to_string)
}
