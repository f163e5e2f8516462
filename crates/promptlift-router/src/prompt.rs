//! Router prompt rendering
//!
//! One request per step carries everything the model needs: the original
//! prompt, what has already been done, the closed action vocabulary, and the
//! response contract. Extraction actions must include their payload inline
//! in the same response, which is what keeps the loop at one LLM call per
//! step.

use promptlift_types::Action;
use strum::IntoEnumIterator;

/// Marker rendered when no actions have completed yet.
const NONE_YET: &str = "(none yet)";

const SYSTEM_PROMPT: &str = "\
You are the routing component of a prompt-analysis pipeline. Each turn you \
pick exactly one next action from a fixed vocabulary, based on the original \
prompt and the actions already completed. You respond with a single JSON \
object and nothing else: no prose, no markdown fences.";

/// System message for every router call.
#[must_use]
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Render the user message for one router step.
#[must_use]
pub fn render_router_prompt(prompt: &str, completed: &[Action]) -> String {
    let completed_list = if completed.is_empty() {
        NONE_YET.to_string()
    } else {
        completed
            .iter()
            .map(|a| format!("- {}", a.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let actions = Action::iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Original prompt under analysis:\n\
         ---\n\
         {prompt}\n\
         ---\n\n\
         Actions already completed:\n\
         {completed_list}\n\n\
         Available actions (pick exactly one not already completed):\n\
         {actions}\n\n\
         Rules:\n\
         - `validate` must happen before anything else.\n\
         - `generateImprovement` must happen before `done`.\n\
         - If you pick an extract* action, perform the extraction NOW and \
         include the result in `extractedData` in this same response \
         (an array of strings for extractTags, an object of named fields \
         for the others). Do not defer it.\n\
         - Pick `done` only when validation, the useful extractions, and \
         the improvement are all complete.\n\n\
         Respond with exactly one JSON object:\n\
         {{\n\
         \"nextAction\": \"<action>\",\n\
         \"reasoning\": \"<why this action is next>\",\n\
         \"progress\": \"<optional step estimate>\",\n\
         \"extractedData\": <payload, only for extract* actions>,\n\
         \"reasoningType\": \"analytical|sequential|pattern-matching|contextual\",\n\
         \"confidence\": <0.0 to 1.0>,\n\
         \"selfCheck\": {{\n\
         \"isActionValid\": <bool>,\n\
         \"potentialIssues\": [\"<issue>\", ...],\n\
         \"alternativeAction\": \"<optional action>\"\n\
         }},\n\
         \"fallbackAction\": \"<an alternative action you would accept>\"\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_completed_list_renders_marker() {
        let rendered = render_router_prompt("improve this", &[]);
        assert!(rendered.contains(NONE_YET));
        assert!(rendered.contains("improve this"));
    }

    #[test]
    fn completed_actions_render_as_list() {
        let rendered =
            render_router_prompt("improve this", &[Action::Validate, Action::ExtractIntent]);
        assert!(rendered.contains("- validate"));
        assert!(rendered.contains("- extractIntent"));
        assert!(!rendered.contains(NONE_YET));
    }

    #[test]
    fn all_ten_actions_are_enumerated() {
        let rendered = render_router_prompt("x", &[]);
        for action in [
            "validate",
            "extractPersonal",
            "extractProfessional",
            "extractTask",
            "extractIntent",
            "extractTone",
            "extractExternal",
            "extractTags",
            "generateImprovement",
            "done",
        ] {
            assert!(rendered.contains(action), "missing {action}");
        }
    }

    #[test]
    fn response_contract_names_the_required_fields() {
        let rendered = render_router_prompt("x", &[]);
        assert!(rendered.contains("\"nextAction\""));
        assert!(rendered.contains("\"extractedData\""));
        assert!(rendered.contains("\"fallbackAction\""));
    }
}
