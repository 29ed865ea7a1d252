//! Persona book loading.
//!
//! A persona book is a YAML document with:
//! - one persona per `Mode` (instruction + UI copy)
//! - named Handlebars templates for the prompt and the verdict card

use court_core::Mode;
use serde::Deserialize;
use std::collections::HashMap;

use crate::PromptError;

/// Template rendering the instruction sent to the service
pub const PROMPT_TEMPLATE: &str = "verdict_prompt";

/// Template rendering a verdict for the terminal
pub const CARD_TEMPLATE: &str = "verdict_card";

const BUILTIN_BOOK: &str = include_str!("../personas/default.yaml");

/// Top-level persona book
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaBook {
    pub version: String,
    pub personas: HashMap<String, Persona>,
    pub templates: HashMap<String, Template>,
}

/// Tone of the judge and the copy that goes with it
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub description: String,
    /// System instruction fixing the judge's persona
    pub instruction: String,
    pub copy: PersonaCopy,
}

/// User-facing strings for one persona
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaCopy {
    pub mode_label: String,
    pub heading: String,
    pub subheading: String,
    pub plaintiff_placeholder: String,
    pub defendant_placeholder: String,
    pub loading_title: String,
    pub loading_message: String,
    /// Handlebars string; `{{limit}}` is available
    pub limit_reached: String,
    pub unlock_title: String,
    pub share_text: String,
    pub judge_signature: String,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

impl PersonaBook {
    /// The book shipped with the binary
    pub fn builtin() -> Result<Self, PromptError> {
        Self::from_yaml(BUILTIN_BOOK)
    }

    /// Load a book from a YAML file
    pub fn load(path: &str) -> Result<Self, PromptError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptError::Template(format!("Failed to read persona book {}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and check a book
    pub fn from_yaml(yaml: &str) -> Result<Self, PromptError> {
        let book: PersonaBook = serde_yaml::from_str(yaml)
            .map_err(|e| PromptError::Template(format!("Failed to parse persona book: {}", e)))?;
        book.validate()?;
        Ok(book)
    }

    /// Every mode needs a persona and both templates must exist
    fn validate(&self) -> Result<(), PromptError> {
        for mode in [Mode::Standard, Mode::AlternatePersona] {
            self.persona(mode)?;
        }
        for name in [PROMPT_TEMPLATE, CARD_TEMPLATE] {
            if !self.templates.contains_key(name) {
                return Err(PromptError::Template(format!("missing template '{}'", name)));
            }
        }
        Ok(())
    }

    pub fn persona(&self, mode: Mode) -> Result<&Persona, PromptError> {
        self.personas
            .get(mode.persona_key())
            .ok_or_else(|| PromptError::UnknownPersona(mode.persona_key().to_string()))
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }
}
