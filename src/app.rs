use crate::api::{QueryResponse, UploadResponse};
use crate::config::Config;
use crate::conversation::{ConversationPanel, MessageId, PendingQuery};
use crate::errors::BeautiragResult;
use crate::models::ValidatedConfig;
use crate::selection::ModelSelection;
use crate::status_indicator::StatusIndicator;
use crate::upload::{UploadBatch, UploadPanel};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Main,
    QuitConfirm,
    Quit,
}

/// The pane receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Upload,
    Model,
    Chat,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Upload => Focus::Model,
            Focus::Model => Focus::Chat,
            Focus::Chat => Focus::Upload,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Upload => Focus::Chat,
            Focus::Model => Focus::Upload,
            Focus::Chat => Focus::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online(String),
    Offline(String),
}

/// Work the runtime has to carry out off the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(PendingQuery),
    Upload(UploadBatch),
}

/// Everything the UI loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    QuerySettled {
        placeholder_id: MessageId,
        result: BeautiragResult<QueryResponse>,
    },
    UploadSettled(BeautiragResult<UploadResponse>),
    Health(BeautiragResult<String>),
}

/// Root of the screen. Owns the validated configuration and the three panes.
pub struct App {
    pub state: AppState,
    pub focus: Focus,
    pub backend_url: String,
    pub backend_status: BackendStatus,
    pub selection: ModelSelection,
    pub upload: UploadPanel,
    pub conversation: ConversationPanel,
    pub status_indicator: StatusIndicator,
    /// The terminal reports modifiers on Enter, so Shift+Enter is usable.
    pub keyboard_enhanced: bool,
    validated: ValidatedConfig,
    uploads_in_flight: usize,
}

impl App {
    pub fn new(config: &Config) -> App {
        App {
            state: AppState::Main,
            focus: Focus::Chat,
            backend_url: config.base_url().to_string(),
            backend_status: BackendStatus::Unknown,
            selection: ModelSelection::new(&config.default_model),
            upload: UploadPanel::new(),
            conversation: ConversationPanel::new(),
            status_indicator: StatusIndicator::new(),
            keyboard_enhanced: false,
            validated: ValidatedConfig::new(config.default_model.clone(), String::new()),
            uploads_in_flight: 0,
        }
    }

    /// The pair the chat currently runs with.
    pub fn validated(&self) -> &ValidatedConfig {
        &self.validated
    }

    /// Replaces the validated pair. The only way it ever changes.
    pub fn apply_validated(&mut self, validated: ValidatedConfig) {
        log::info!("active model is now {}", validated.model);
        self.validated = validated;
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Option<Command> {
        let command = match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.handle_key(key, now)
            }
            AppEvent::Input(Event::Paste(text)) => self.handle_paste(&text),
            AppEvent::Input(_) => None,
            AppEvent::Tick => {
                self.selection.tick(now);
                self.status_indicator.advance_spinner();
                None
            }
            AppEvent::QuerySettled {
                placeholder_id,
                result,
            } => {
                self.conversation.settle(placeholder_id, result);
                None
            }
            AppEvent::UploadSettled(result) => {
                self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
                self.upload.settle(result);
                None
            }
            AppEvent::Health(result) => {
                self.backend_status = match result {
                    Ok(message) => BackendStatus::Online(message),
                    Err(err) => BackendStatus::Offline(err.to_string()),
                };
                None
            }
        };

        if let Some(Command::Upload(_)) = &command {
            self.uploads_in_flight += 1;
        }
        self.status_indicator
            .update(self.conversation.is_awaiting(), self.uploads_in_flight > 0);
        command
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state = AppState::Quit;
            return None;
        }

        match self.state {
            AppState::QuitConfirm => {
                self.handle_quit_confirm_input(key);
                None
            }
            AppState::Quit => None,
            AppState::Main => self.handle_main_input(key, now),
        }
    }

    fn handle_quit_confirm_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.state = AppState::Quit;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.state = AppState::Main;
            }
            _ => {}
        }
    }

    fn handle_main_input(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::QuitConfirm;
                return None;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Upload => self.upload.handle_key(key).map(Command::Upload),
            Focus::Model => {
                if let Some(validated) = self.selection.handle_key(key, now) {
                    self.apply_validated(validated);
                }
                None
            }
            Focus::Chat => self
                .conversation
                .handle_key(key, &self.validated)
                .map(Command::Query),
        }
    }

    /// Bracketed paste, which is also what a terminal emits on file drop.
    fn handle_paste(&mut self, text: &str) -> Option<Command> {
        if self.state != AppState::Main {
            return None;
        }
        match self.focus {
            Focus::Upload => self.upload.paste(text),
            Focus::Model if self.selection.requires_api_key() => {
                let mut key = self.selection.api_key().to_string();
                key.push_str(text.trim());
                self.selection.set_api_key(&key);
            }
            Focus::Model => {}
            Focus::Chat => {
                let mut input = self.conversation.input().to_string();
                input.push_str(&text.replace("\r\n", "\n"));
                self.conversation.set_input(&input);
            }
        }
        None
    }
}
