//! Action executor sub-calls
//!
//! Only two actions issue their own LLM call: `validate` and
//! `generateImprovement`. Every extraction action already carries its result
//! in the router's response, so the executor for those is a passthrough in
//! the orchestrator. The templates here are configuration detail; the output
//! shapes are part of the result contract.

use promptlift_llm::{LlmBackend, LlmRequest, Message};
use promptlift_types::{ImprovementSuggestion, ValidationReport};
use promptlift_utils::LlmError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

const VALIDATE_SYSTEM: &str = "\
You assess the quality of prompts written for large language models. \
Respond with a single JSON object and nothing else.";

const IMPROVE_SYSTEM: &str = "\
You rewrite prompts for large language models to be clearer and more \
effective, using the structured context gathered about the author. Respond \
with a single JSON object and nothing else.";

/// Assess prompt quality via one LLM call.
///
/// # Errors
///
/// Propagates the backend's classified error; an unparseable response is a
/// `Transport` error (locally recoverable, the loop continues past it).
pub async fn validate_prompt_quality(
    backend: &Arc<dyn LlmBackend>,
    prompt: &str,
) -> Result<ValidationReport, LlmError> {
    let user = format!(
        "Assess the following prompt:\n\
         ---\n\
         {prompt}\n\
         ---\n\n\
         Respond with exactly one JSON object:\n\
         {{\n\
         \"isAcceptable\": <bool>,\n\
         \"qualityScore\": <0.0 to 1.0>,\n\
         \"issues\": [\"<concrete problem>\", ...],\n\
         \"summary\": \"<one-line assessment>\"\n\
         }}"
    );

    let request = LlmRequest::new(
        "validate",
        vec![Message::system(VALIDATE_SYSTEM), Message::user(user)],
    );
    let response = backend.send(request).await?;
    let report: ValidationReport = parse_model_json(&response.text, "validation")?;

    debug!(
        is_acceptable = report.is_acceptable,
        quality_score = report.quality_score,
        "validation completed"
    );
    Ok(report)
}

/// Generate an improved prompt via one LLM call.
///
/// `context_summary` is the rendered accumulated context; an empty summary
/// is valid when no extraction has succeeded yet.
///
/// # Errors
///
/// Propagates the backend's classified error; an unparseable response is a
/// `Transport` error.
pub async fn generate_improved_prompt(
    backend: &Arc<dyn LlmBackend>,
    prompt: &str,
    context_summary: &str,
) -> Result<ImprovementSuggestion, LlmError> {
    let context_block = if context_summary.is_empty() {
        "(no context gathered)".to_string()
    } else {
        context_summary.to_string()
    };

    let user = format!(
        "Rewrite the following prompt to be clearer and more effective.\n\n\
         Original prompt:\n\
         ---\n\
         {prompt}\n\
         ---\n\n\
         Context gathered about the author:\n\
         {context_block}\n\n\
         Respond with exactly one JSON object:\n\
         {{\n\
         \"improvedPrompt\": \"<the rewritten prompt>\",\n\
         \"improvements\": [\"<what changed>\", ...],\n\
         \"reasoning\": \"<why the rewrite is better>\",\n\
         \"contextUsed\": [\"<context field that informed the rewrite>\", ...]\n\
         }}"
    );

    let request = LlmRequest::new(
        "improve",
        vec![Message::system(IMPROVE_SYSTEM), Message::user(user)],
    );
    let response = backend.send(request).await?;
    let suggestion: ImprovementSuggestion = parse_model_json(&response.text, "improvement")?;

    debug!(
        improvements = suggestion.improvements.len(),
        "improvement generated"
    );
    Ok(suggestion)
}

/// Parse a model response as JSON after stripping an optional markdown fence.
fn parse_model_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, LlmError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body)
        .map_err(|e| LlmError::Transport(format!("unparseable {what} response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlift_llm::MockBackend;

    fn backend_with(mock: MockBackend) -> Arc<dyn LlmBackend> {
        Arc::new(mock)
    }

    #[tokio::test]
    async fn validation_parses_report() {
        let mock = MockBackend::new();
        mock.push_text(
            r#"{"isAcceptable": false, "qualityScore": 0.3, "issues": ["too vague"], "summary": "needs work"}"#,
        );
        let backend = backend_with(mock);

        let report = validate_prompt_quality(&backend, "help me").await.unwrap();
        assert!(!report.is_acceptable);
        assert_eq!(report.issues, vec!["too vague"]);
    }

    #[tokio::test]
    async fn validation_unwraps_fenced_response() {
        let mock = MockBackend::new();
        mock.push_text(
            "```json\n{\"isAcceptable\": true, \"qualityScore\": 0.9, \"issues\": [], \"summary\": \"fine\"}\n```",
        );
        let backend = backend_with(mock);

        let report = validate_prompt_quality(&backend, "p").await.unwrap();
        assert!(report.is_acceptable);
    }

    #[tokio::test]
    async fn unparseable_validation_is_a_transport_error() {
        let mock = MockBackend::new();
        mock.push_text("the prompt looks fine to me");
        let backend = backend_with(mock);

        let err = validate_prompt_quality(&backend, "p").await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(msg) if msg.contains("validation")));
    }

    #[tokio::test]
    async fn improvement_carries_context_into_the_request() {
        let mock = MockBackend::new();
        mock.push_text(
            r#"{"improvedPrompt": "better", "improvements": ["clarity"], "reasoning": "r", "contextUsed": ["extractIntent"]}"#,
        );
        let mock = Arc::new(mock);
        let backend: Arc<dyn LlmBackend> = mock.clone();

        let suggestion =
            generate_improved_prompt(&backend, "help me", "extractIntent: learn rust")
                .await
                .unwrap();
        assert_eq!(suggestion.improved_prompt, "better");

        let requests = mock.requests();
        assert!(requests[0].messages[1].content.contains("learn rust"));
    }

    #[tokio::test]
    async fn improvement_with_empty_context_marks_it() {
        let mock = MockBackend::new();
        mock.push_text(r#"{"improvedPrompt": "better", "reasoning": "r"}"#);
        let mock = Arc::new(mock);
        let backend: Arc<dyn LlmBackend> = mock.clone();

        generate_improved_prompt(&backend, "p", "").await.unwrap();
        assert!(mock.requests()[0].messages[1]
            .content
            .contains("(no context gathered)"));
    }

    #[tokio::test]
    async fn backend_errors_propagate_unchanged() {
        let mock = MockBackend::new();
        mock.push_error(LlmError::RateLimited("429".into()));
        let backend = backend_with(mock);

        let err = validate_prompt_quality(&backend, "p").await.unwrap_err();
        assert!(err.is_rate_limit());
    }
}
