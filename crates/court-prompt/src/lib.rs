//! Court Prompt: personas, prompt construction and verdict cards
//!
//! # Example
//!
//! ```
//! use court_core::{CaseInput, Mode};
//! use court_prompt::PromptRenderer;
//!
//! let renderer = PromptRenderer::builtin().unwrap();
//! let input = CaseInput::new("He ate my leftovers", "It had no name on it");
//! let prompt = renderer.render_prompt(&input, Mode::Standard).unwrap();
//! assert!(prompt.contains("\"He ate my leftovers\""));
//! ```

pub mod renderer;
pub mod schema;
pub mod templates;

pub use renderer::PromptRenderer;
pub use schema::{verdict_response_schema, VERDICT_FIELDS};
pub use templates::{Persona, PersonaBook, PersonaCopy};

use thiserror::Error;

/// Errors that can occur while loading or rendering personas
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),
}
