//! Dream dialogue generation.
//!
//! The generator is invoked once per exported record. A failure only
//! leaves that record's dialogue empty.

use crate::core::record::{DreamRecord, DreamType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Generated dialogue for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub text: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DialogueError {
    #[error("record {0} has no dream type")]
    Unlabeled(String),
    #[error("no template for dream type {0}")]
    MissingTemplate(DreamType),
}

/// Produces display dialogue for an exported record.
pub trait DialogueGenerator {
    fn make_dialogue(&self, record: &DreamRecord) -> Result<Dialogue, DialogueError>;
}

/// Template-based generator.
///
/// Templates may reference `{plant}` (plant type, or "plant") and
/// `{stamp}` (the dream stamp ID).
#[derive(Debug, Clone)]
pub struct TemplateDialogue {
    templates: BTreeMap<DreamType, String>,
}

impl TemplateDialogue {
    pub fn new(templates: BTreeMap<DreamType, String>) -> Self {
        Self { templates }
    }
}

impl Default for TemplateDialogue {
    fn default() -> Self {
        let templates = [
            (DreamType::Dry, "My roots are parched... could this {plant} have a drink soon?"),
            (DreamType::Sunny, "Basking in the light! This {plant} is having a golden dream."),
            (DreamType::Misty, "Everything feels soft and hazy. This {plant} is drifting through the mist."),
            (DreamType::Rainy, "Ahh, cool water at last. This {plant} feels refreshed."),
        ]
        .into_iter()
        .map(|(dream, text)| (dream, text.to_string()))
        .collect();

        Self { templates }
    }
}

impl DialogueGenerator for TemplateDialogue {
    fn make_dialogue(&self, record: &DreamRecord) -> Result<Dialogue, DialogueError> {
        let dream = record
            .dream_type
            .ok_or_else(|| DialogueError::Unlabeled(record.dream_stamp_id.clone()))?;
        let template = self
            .templates
            .get(&dream)
            .ok_or(DialogueError::MissingTemplate(dream))?;

        let plant = record.plant_type.as_deref().unwrap_or("plant");
        Ok(Dialogue {
            text: template
                .replace("{plant}", plant)
                .replace("{stamp}", &record.dream_stamp_id),
        })
    }
}
