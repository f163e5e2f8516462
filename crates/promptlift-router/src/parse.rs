//! Decision parsing
//!
//! The model is told to emit bare JSON, but models wrap output in markdown
//! fences often enough that stripping them is table stakes. Beyond fence
//! removal the parse is fail-closed: a missing or unknown `nextAction`
//! rejects the whole response, which routes the caller into the
//! deterministic fallback.

use promptlift_types::RouterDecision;

/// Parse a raw model response into a decision.
///
/// Returns `None` for anything unusable: non-JSON, JSON without a valid
/// `nextAction`, or an action name outside the vocabulary.
#[must_use]
pub fn parse_decision(raw: &str) -> Option<RouterDecision> {
    let body = strip_fences(raw);
    serde_json::from_str(body).ok()
}

/// Remove a surrounding markdown code fence, if present.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    match inner.split_once('\n') {
        Some((first_line, rest)) if first_line.trim().chars().all(char::is_alphanumeric) => {
            rest.trim()
        }
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlift_types::Action;

    #[test]
    fn parses_bare_json() {
        let decision =
            parse_decision(r#"{"nextAction": "validate", "reasoning": "first step"}"#).unwrap();
        assert_eq!(decision.next_action, Action::Validate);
    }

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"nextAction\": \"extractTags\", \"reasoning\": \"r\", \"extractedData\": [\"a\"]}\n```";
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.next_action, Action::ExtractTags);
        assert_eq!(decision.extracted_data, Some(serde_json::json!(["a"])));
    }

    #[test]
    fn strips_untagged_fence() {
        let raw = "```\n{\"nextAction\": \"done\", \"reasoning\": \"r\"}\n```";
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.next_action, Action::Done);
    }

    #[test]
    fn rejects_missing_next_action() {
        assert!(parse_decision(r#"{"reasoning": "no action"}"#).is_none());
    }

    #[test]
    fn rejects_unknown_action_name() {
        assert!(parse_decision(r#"{"nextAction": "deploy", "reasoning": "r"}"#).is_none());
    }

    #[test]
    fn rejects_prose() {
        assert!(parse_decision("I think the next step should be validation.").is_none());
    }
}
