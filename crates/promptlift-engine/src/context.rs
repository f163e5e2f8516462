//! Run hand-off to the persistence collaborator
//!
//! At loop exit the orchestrator merges extraction fragments into one
//! aggregate object and hands it to a [`ContextSink`] together with the
//! original prompt, the validation result, and the full step list.
//! Persistence itself lives outside the engine; [`MemoryContextStore`] is
//! the in-process default used by the CLI and by tests.

use promptlift_types::{OrchestrationStep, ValidationReport};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Everything the engine hands off when a run ends.
pub struct RunHandoff<'a> {
    /// The original prompt under analysis
    pub prompt: &'a str,
    /// Extraction fragments merged by action name
    pub context: &'a BTreeMap<String, serde_json::Value>,
    /// The validation result, if the `validate` step ran
    pub validation: Option<&'a ValidationReport>,
    /// The full ordered step list, for history logging
    pub steps: &'a [OrchestrationStep],
}

/// Receives the merged run output at the end of a run (including an
/// aborted one; fragments already paid for are not discarded).
pub trait ContextSink: Send + Sync {
    fn store(&self, handoff: &RunHandoff<'_>);
}

/// What [`MemoryContextStore`] retains from the most recent run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub prompt: String,
    pub context: BTreeMap<String, serde_json::Value>,
    pub step_count: usize,
}

/// In-memory sink that keeps the most recent run.
#[derive(Default)]
pub struct MemoryContextStore {
    latest_run: Mutex<Option<StoredRun>>,
}

impl MemoryContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The context stored by the most recent run, if any.
    #[must_use]
    pub fn latest(&self) -> Option<BTreeMap<String, serde_json::Value>> {
        self.lock().as_ref().map(|run| run.context.clone())
    }

    /// The full record of the most recent run, if any.
    #[must_use]
    pub fn latest_run(&self) -> Option<StoredRun> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredRun>> {
        self.latest_run.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ContextSink for MemoryContextStore {
    fn store(&self, handoff: &RunHandoff<'_>) {
        *self.lock() = Some(StoredRun {
            prompt: handoff.prompt.to_string(),
            context: handoff.context.clone(),
            step_count: handoff.steps.len(),
        });
    }
}

/// Render accumulated context as one line per fragment, for inclusion in the
/// improvement prompt.
#[must_use]
pub fn context_summary(context: &BTreeMap<String, serde_json::Value>) -> String {
    context
        .iter()
        .map(|(action, payload)| format!("{action}: {payload}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_renders_one_line_per_fragment() {
        let mut context = BTreeMap::new();
        context.insert("extractIntent".to_string(), json!({"intent": "learn rust"}));
        context.insert("extractTags".to_string(), json!(["rust", "llm"]));

        let summary = context_summary(&context);
        assert_eq!(summary.lines().count(), 2);
        assert!(summary.contains("extractIntent"));
        assert!(summary.contains("learn rust"));
    }

    #[test]
    fn empty_context_renders_empty() {
        assert_eq!(context_summary(&BTreeMap::new()), "");
    }

    #[test]
    fn memory_store_keeps_latest_run() {
        let store = MemoryContextStore::new();
        assert!(store.latest().is_none());

        let mut context = BTreeMap::new();
        context.insert("extractTags".to_string(), json!(["a"]));
        store.store(&RunHandoff {
            prompt: "help me",
            context: &context,
            validation: None,
            steps: &[],
        });

        assert_eq!(store.latest(), Some(context));
        let run = store.latest_run().unwrap();
        assert_eq!(run.prompt, "help me");
        assert_eq!(run.step_count, 0);
    }
}
