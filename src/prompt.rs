// Prompt surface. Workflows only talk to the `Prompter` trait so they can be
// driven by a script in tests; `DialoguerPrompter` renders the questions in
// the terminal with `dialoguer`.

use crate::validate::{self, Validator};
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

/// A single-line text question.
#[derive(Debug, Clone)]
pub struct TextQuestion<'a> {
    pub prompt: &'a str,
    /// Pre-filled answer, returned when the operator just presses Enter.
    pub default: Option<String>,
    pub validator: Option<Validator>,
    /// Blank answers are accepted.
    pub optional: bool,
}

impl<'a> TextQuestion<'a> {
    pub fn new(prompt: &'a str) -> Self {
        TextQuestion {
            prompt,
            default: None,
            validator: None,
            optional: false,
        }
    }

    /// Pre-fill with `value` unless it is blank.
    pub fn default_to(mut self, value: &str) -> Self {
        self.default = Some(value.to_string()).filter(|v| !v.is_empty());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Run the validator (if any) against a proposed answer.
    pub fn check(&self, answer: &str) -> Result<(), String> {
        if answer.trim().is_empty() {
            return if self.optional {
                Ok(())
            } else {
                validate::required(answer)
            };
        }
        match self.validator {
            Some(validator) => validator(answer),
            None => Ok(()),
        }
    }
}

/// What the workflows need from the terminal.
pub trait Prompter {
    fn text(&self, question: &TextQuestion<'_>) -> Result<String>;

    /// Single choice; returns the index into `items`.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Keyboard-driven prompts in the terminal.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        DialoguerPrompter
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, question: &TextQuestion<'_>) -> Result<String> {
        let mut input = Input::<String>::new();
        input
            .with_prompt(question.prompt)
            .allow_empty(question.optional);
        if let Some(default) = &question.default {
            input.default(default.clone());
        }
        let checked = question.clone();
        input.validate_with(move |answer: &String| -> Result<(), String> { checked.check(answer) });
        let answer = input.interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?;
        Ok(selection)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_default_is_not_prefilled() {
        assert_eq!(TextQuestion::new("City").default_to("").default, None);
        assert_eq!(
            TextQuestion::new("City").default_to("Boston").default.as_deref(),
            Some("Boston")
        );
    }

    #[test]
    fn optional_questions_skip_the_validator_on_blank_answers() {
        let question = TextQuestion::new("Tariff")
            .validate(validate::country_code)
            .optional();
        assert!(question.check("").is_ok());
        assert!(question.check("USA").is_err());
    }

    #[test]
    fn required_questions_reject_blank_answers() {
        let question = TextQuestion::new("Name");
        assert_eq!(question.check("  "), validate::required("  "));
        assert!(question.check("  ").is_err());
        assert!(question.check("Mr Hippo").is_ok());
    }
}
