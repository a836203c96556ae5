// ABOUTME: Messages exchanged between page-side detection and the coordinator.
// ABOUTME: JSON shape is {"kind": "...", "data": ...} with kebab-case kinds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MessageError;
use crate::models::{CandidateSource, RawRecipe};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Message {
    /// A page found a raw recipe candidate.
    RecipeDetected {
        data: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<CandidateSource>,
    },
    /// A page asks the coordinator to run detection on its HTML.
    TryExtractRecipe { data: String },
}

impl Message {
    pub fn from_json(input: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wraps a detected candidate for delivery to the coordinator.
    pub fn from_detection(raw: RawRecipe) -> Self {
        let source = match &raw {
            RawRecipe::JsonLd(_) => Some(CandidateSource::JsonLd),
            RawRecipe::Microdata(_) => Some(CandidateSource::Microdata),
            RawRecipe::LegacyVocab(_) => None,
        };
        Message::RecipeDetected {
            data: raw.into_map(),
            source,
        }
    }
}
