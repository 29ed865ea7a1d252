//! Prompt and verdict-card rendering.
//!
//! Handlebars with HTML escaping turned off: case statements must reach the
//! service verbatim. One custom helper, `upper`, for the card headings.

use court_core::{CaseInput, Mode, Party, Verdict};
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::{json, Value};

use crate::templates::{PersonaBook, PersonaCopy, CARD_TEMPLATE, PROMPT_TEMPLATE};
use crate::PromptError;

handlebars_helper!(upper: |s: str| s.to_uppercase());

/// Compiled persona book with registered helpers
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
    book: PersonaBook,
}

impl PromptRenderer {
    pub fn new(book: PersonaBook) -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("upper", Box::new(upper));

        for (name, template) in &book.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| PromptError::Template(format!("template '{}': {}", name, e)))?;
        }

        Ok(Self { handlebars, book })
    }

    /// Renderer over the built-in persona book
    pub fn builtin() -> Result<Self, PromptError> {
        Self::new(PersonaBook::builtin()?)
    }

    /// Instruction for one case: persona, both statements quoted, JSON-only reply
    pub fn render_prompt(&self, input: &CaseInput, mode: Mode) -> Result<String, PromptError> {
        let persona = self.book.persona(mode)?;
        let data = json!({
            "instruction": persona.instruction.trim(),
            "plaintiff": input.plaintiff_text,
            "defendant": input.defendant_text,
        });
        self.render(PROMPT_TEMPLATE, &data)
    }

    /// Decree shown after a successful verdict
    pub fn render_card(
        &self,
        verdict: &Verdict,
        mode: Mode,
        case_number: u32,
    ) -> Result<String, PromptError> {
        let persona = self.book.persona(mode)?;
        let stamp = match verdict.winner {
            Party::Plaintiff => "GRANTED",
            Party::Defendant => "DENIED",
        };
        let data = json!({
            "case_number": case_number,
            "winner": verdict.winner.as_str(),
            "loser": verdict.loser().as_str(),
            "stamp": stamp,
            "sentence": verdict.sentence,
            "roast": verdict.roast,
            "detailed_verdict": verdict.detailed_verdict,
            "signature": persona.copy.judge_signature,
        });
        self.render(CARD_TEMPLATE, &data)
    }

    /// UI copy for a mode
    pub fn copy(&self, mode: Mode) -> Result<&PersonaCopy, PromptError> {
        Ok(&self.book.persona(mode)?.copy)
    }

    /// Limit-reached notice with the limit filled in
    pub fn limit_notice(&self, mode: Mode, limit: u32) -> Result<String, PromptError> {
        let copy = self.copy(mode)?;
        self.render_string(&copy.limit_reached, &json!({ "limit": limit }))
    }

    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, PromptError> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| PromptError::Render(e.to_string()))
    }

    pub fn render_string(&self, template: &str, data: &Value) -> Result<String, PromptError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| PromptError::Render(e.to_string()))
    }
}
