// src/selection.rs

use crate::constants::{MSG_CONFIG_APPLIED, MSG_KEY_REQUIRED, VALIDATION_MESSAGE_TTL_SECS};
use crate::models::{model_options, provider_for_model, requires_api_key, ModelOption, Provider, ValidatedConfig};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Error,
    Success,
}

/// Inline feedback under the credential field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub text: String,
    pub kind: ValidationKind,
    /// Success messages disappear at this instant; errors stay until the next edit.
    pub expires_at: Option<Instant>,
}

/// Model picker plus credential entry.
#[derive(Debug)]
pub struct ModelSelection {
    options: Vec<ModelOption>,
    model: String,
    api_key: String,
    key_visible: bool,
    validation_message: Option<ValidationMessage>,
}

impl ModelSelection {
    pub fn new(default_model: &str) -> Self {
        Self {
            options: model_options(),
            model: default_model.to_string(),
            api_key: String::new(),
            key_visible: false,
            validation_message: None,
        }
    }

    pub fn options(&self) -> &[ModelOption] {
        &self.options
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn key_visible(&self) -> bool {
        self.key_visible
    }

    pub fn provider(&self) -> Option<Provider> {
        provider_for_model(&self.model)
    }

    pub fn validation_message(&self) -> Option<&ValidationMessage> {
        self.validation_message.as_ref()
    }

    /// Whether the credential field and the Validate action are shown.
    pub fn requires_api_key(&self) -> bool {
        requires_api_key(&self.model)
    }

    /// Index of the active model in the option list, if it is a catalog model.
    pub fn selected_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.value == self.model)
    }

    /// Switches model and drops anything typed for the previous one.
    pub fn select_model(&mut self, model: &str) {
        self.model = model.to_string();
        self.api_key.clear();
        self.key_visible = false;
        self.validation_message = None;
    }

    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(i) => (i + 1) % self.options.len(),
            None => 0,
        };
        let model = self.options[next].value;
        self.select_model(model);
    }

    pub fn select_previous(&mut self) {
        let len = self.options.len();
        let prev = match self.selected_index() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        let model = self.options[prev].value;
        self.select_model(model);
    }

    pub fn push_key_char(&mut self, c: char) {
        self.api_key.push(c);
        self.validation_message = None;
    }

    pub fn pop_key_char(&mut self) {
        self.api_key.pop();
        self.validation_message = None;
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = key.to_string();
        self.validation_message = None;
    }

    pub fn toggle_key_visibility(&mut self) {
        self.key_visible = !self.key_visible;
    }

    /// Credential as it should appear on screen.
    pub fn display_key(&self) -> String {
        if self.key_visible {
            self.api_key.clone()
        } else {
            "•".repeat(self.api_key.chars().count())
        }
    }

    /// Checks the entry and hands the pair upstream on success.
    ///
    /// Returns the pair exactly as entered; the panel forgets the credential
    /// right after. On failure nothing is returned and an inline message is set.
    pub fn validate(&mut self, now: Instant) -> Option<ValidatedConfig> {
        if self.requires_api_key() && self.api_key.trim().is_empty() {
            self.validation_message = Some(ValidationMessage {
                text: MSG_KEY_REQUIRED.to_string(),
                kind: ValidationKind::Error,
                expires_at: None,
            });
            return None;
        }

        let validated = ValidatedConfig::new(self.model.clone(), std::mem::take(&mut self.api_key));
        self.key_visible = false;
        self.validation_message = Some(ValidationMessage {
            text: MSG_CONFIG_APPLIED.to_string(),
            kind: ValidationKind::Success,
            expires_at: Some(now + Duration::from_secs(VALIDATION_MESSAGE_TTL_SECS)),
        });

        log::info!("configuration validated for model {}", validated.model);
        Some(validated)
    }

    /// Drops an expired success message.
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .validation_message
            .as_ref()
            .and_then(|m| m.expires_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.validation_message = None;
        }
    }

    /// Key handling while the pane has focus. Returns the validated pair when
    /// Enter succeeds.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<ValidatedConfig> {
        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Enter => return self.validate(now),
            KeyCode::Backspace if self.requires_api_key() => self.pop_key_char(),
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_key_visibility()
            }
            KeyCode::Char(c)
                if self.requires_api_key() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.push_key_char(c)
            }
            _ => {}
        }
        None
    }
}
