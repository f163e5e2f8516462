//! The fixed ten-action vocabulary the router chooses from

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One named unit of work in the pipeline.
///
/// The vocabulary is closed: the router is instructed to pick exactly one of
/// these per step, and anything outside it fails decision parsing closed.
/// Serialized names match the wire contract the model is told to emit
/// (`camelCase`, e.g. `extractPersonal`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Action {
    /// Assess prompt quality (real sub-call)
    Validate,
    /// Extract personal details about the author
    ExtractPersonal,
    /// Extract professional background
    ExtractProfessional,
    /// Extract the concrete task being asked for
    ExtractTask,
    /// Extract the underlying intent
    ExtractIntent,
    /// Extract tone and register preferences
    ExtractTone,
    /// Extract references to external tools, documents or systems
    ExtractExternal,
    /// Extract short topical tags
    ExtractTags,
    /// Produce the improved prompt (real sub-call)
    GenerateImprovement,
    /// Terminal action; the run is complete
    Done,
}

impl Action {
    /// Whether this action's result rides inline in the router's own
    /// response (`extractedData`) instead of requiring a separate LLM call.
    #[must_use]
    pub fn is_extraction(self) -> bool {
        matches!(
            self,
            Self::ExtractPersonal
                | Self::ExtractProfessional
                | Self::ExtractTask
                | Self::ExtractIntent
                | Self::ExtractTone
                | Self::ExtractExternal
                | Self::ExtractTags
        )
    }

    /// Whether this action ends the run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Wire name as the model sees it (camelCase).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::ExtractPersonal => "extractPersonal",
            Self::ExtractProfessional => "extractProfessional",
            Self::ExtractTask => "extractTask",
            Self::ExtractIntent => "extractIntent",
            Self::ExtractTone => "extractTone",
            Self::ExtractExternal => "extractExternal",
            Self::ExtractTags => "extractTags",
            Self::GenerateImprovement => "generateImprovement",
            Self::Done => "done",
        }
    }
}
