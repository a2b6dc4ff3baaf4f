// src/conversation.rs

use crate::api::{QueryRequest, QueryResponse};
use crate::constants::{INPUT_MAX_LINES, LOADING_PLACEHOLDER, MSG_NETWORK_ERROR, MSG_QUERY_FAILED};
use crate::errors::{BeautiragError, BeautiragResult};
use crate::models::ValidatedConfig;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::{cell::Cell, collections::BTreeMap};
use textwrap::wrap;

/// Millisecond timestamp, bumped when needed so ids stay unique and increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Represents a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub is_loading: bool,
    pub is_error: bool,
}

/// A query the runtime has to send; the reply settles `placeholder_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub placeholder_id: MessageId,
    pub request: QueryRequest,
}

/// Chat pane: transcript, input box and the single in-flight query.
#[derive(Debug, Default)]
pub struct ConversationPanel {
    // Keyed by id; ids grow monotonically so iteration order is transcript order.
    messages: BTreeMap<MessageId, Message>,
    input: String,
    awaiting: Option<MessageId>,
    last_id: u64,
    scroll_from_bottom: u16,
    // Furthest the transcript can scroll, noted by the renderer each frame.
    scroll_limit: Cell<u16>,
}

impl ConversationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_awaiting() && !self.input.trim().is_empty()
    }

    /// The input split at newlines and wrapped to `width` columns.
    pub fn input_lines(&self, width: u16) -> Vec<String> {
        let width = usize::from(width).max(1);
        self.input
            .split('\n')
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    wrap(line, width).into_iter().map(|l| l.into_owned()).collect()
                }
            })
            .collect()
    }

    /// Rows the input box needs at `width` columns, capped at `INPUT_MAX_LINES`.
    pub fn input_height(&self, width: u16) -> u16 {
        let lines = self.input_lines(width).len().max(1);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .min(INPUT_MAX_LINES)
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    pub fn set_scroll_limit(&self, max_scroll: u16) {
        self.scroll_limit.set(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self
            .scroll_from_bottom
            .saturating_add(lines)
            .min(self.scroll_limit.get());
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self
            .scroll_from_bottom
            .min(self.scroll_limit.get())
            .saturating_sub(lines);
    }

    pub fn set_input(&mut self, text: &str) {
        if !self.is_awaiting() {
            self.input = text.to_string();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_awaiting() {
            self.input.push(c);
        }
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if !self.is_awaiting() {
            self.input.pop();
        }
    }

    fn next_id(&mut self) -> MessageId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(self.last_id + 1);
        MessageId(self.last_id)
    }

    fn push(&mut self, text: String, sender: Sender, is_loading: bool) -> MessageId {
        let id = self.next_id();
        self.messages.insert(
            id,
            Message {
                id,
                text,
                sender,
                is_loading,
                is_error: false,
            },
        );
        self.scroll_from_bottom = 0;
        id
    }

    /// Moves the input into the transcript and returns the request to send.
    ///
    /// No-op while a query is in flight or when the input is blank.
    pub fn submit(&mut self, config: &ValidatedConfig) -> Option<PendingQuery> {
        if !self.can_submit() {
            return None;
        }

        let query = std::mem::take(&mut self.input);
        self.push(query.clone(), Sender::User, false);
        let placeholder_id = self.push(LOADING_PLACEHOLDER.to_string(), Sender::Bot, true);
        self.awaiting = Some(placeholder_id);

        log::info!("submitting query with model {}", config.model);
        Some(PendingQuery {
            placeholder_id,
            request: QueryRequest {
                query,
                model_name: config.model.clone(),
                api_key: config.api_key_param(),
            },
        })
    }

    /// Replaces the placeholder with the reply or an error and re-enables input.
    pub fn settle(&mut self, placeholder_id: MessageId, result: BeautiragResult<QueryResponse>) {
        let (text, is_error) = match result {
            Ok(reply) => (reply.response, false),
            Err(err) => {
                log::warn!("query failed: {}", err);
                (query_error_message(&err), true)
            }
        };

        match self.messages.get_mut(&placeholder_id) {
            Some(message) => {
                message.text = text;
                message.is_loading = false;
                message.is_error = is_error;
            }
            None => log::warn!("no placeholder {:?} to settle", placeholder_id),
        }

        if self.awaiting == Some(placeholder_id) {
            self.awaiting = None;
        }
    }

    /// Key handling while the pane has focus.
    pub fn handle_key(&mut self, key: KeyEvent, config: &ValidatedConfig) -> Option<PendingQuery> {
        match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert_newline()
            }
            KeyCode::Enter => return self.submit(config),
            KeyCode::Backspace => self.backspace(),
            KeyCode::PageUp => self.scroll_up(5),
            KeyCode::PageDown => self.scroll_down(5),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c)
            }
            _ => {}
        }
        None
    }
}

fn query_error_message(err: &BeautiragError) -> String {
    let reason = match err {
        BeautiragError::Http { detail, .. } => detail
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| MSG_QUERY_FAILED.to_string()),
        BeautiragError::Transport(msg) if !msg.is_empty() => msg.clone(),
        BeautiragError::Transport(_) => MSG_NETWORK_ERROR.to_string(),
        other => other.to_string(),
    };
    format!("Error: {}", reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendClient;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn config() -> ValidatedConfig {
        ValidatedConfig::new("gpt-4o", "sk-test")
    }

    /// Submits, waits for the backend and settles, as the runtime does.
    async fn send(
        panel: &mut ConversationPanel,
        client: &BackendClient,
        config: &ValidatedConfig,
    ) -> Option<MessageId> {
        let pending = panel.submit(config)?;
        let result = client.query(&pending.request).await;
        panel.settle(pending.placeholder_id, result);
        Some(pending.placeholder_id)
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut panel = ConversationPanel::new();
        assert!(panel.submit(&config()).is_none());

        panel.set_input("   \n\t ");
        assert!(panel.submit(&config()).is_none());
        assert!(panel.is_empty());
        assert!(!panel.is_awaiting());
    }

    #[test]
    fn test_submit_appends_user_message_and_placeholder() {
        let mut panel = ConversationPanel::new();
        panel.set_input("hello there");

        let pending = panel.submit(&config()).unwrap();
        assert_eq!(panel.input(), "");
        assert!(panel.is_awaiting());

        let messages: Vec<_> = panel.messages().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "hello there");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert!(messages[1].is_loading);
        assert_eq!(messages[1].id, pending.placeholder_id);
        assert!(messages[0].id < messages[1].id);

        assert_eq!(
            pending.request,
            QueryRequest {
                query: "hello there".to_string(),
                model_name: "gpt-4o".to_string(),
                api_key: Some("sk-test".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_key_is_sent_as_none() {
        let mut panel = ConversationPanel::new();
        panel.set_input("hi");
        let pending = panel.submit(&ValidatedConfig::new("llama3", "")).unwrap();
        assert_eq!(pending.request.api_key, None);
    }

    #[test]
    fn test_second_submit_while_awaiting_is_noop() {
        let mut panel = ConversationPanel::new();
        panel.set_input("first");
        let pending = panel.submit(&config()).unwrap();

        panel.set_input("second");
        panel.insert_char('x');
        assert_eq!(panel.input(), "");
        assert!(panel.submit(&config()).is_none());
        assert_eq!(panel.len(), 2);

        panel.settle(
            pending.placeholder_id,
            Ok(QueryResponse {
                response: "done".to_string(),
            }),
        );
        assert!(!panel.is_awaiting());

        panel.set_input("second");
        assert!(panel.submit(&config()).is_some());
        assert_eq!(panel.len(), 4);
    }

    #[test]
    fn test_settle_targets_placeholder_by_id() {
        let mut panel = ConversationPanel::new();
        panel.set_input("one");
        let first = panel.submit(&config()).unwrap();
        panel.settle(first.placeholder_id, Ok(QueryResponse { response: "1".to_string() }));

        panel.set_input("two");
        let second = panel.submit(&config()).unwrap();
        panel.settle(
            second.placeholder_id,
            Err(BeautiragError::transport_error("connection reset")),
        );

        assert_eq!(panel.message(first.placeholder_id).unwrap().text, "1");
        let failed = panel.message(second.placeholder_id).unwrap();
        assert_eq!(failed.text, "Error: connection reset");
        assert!(failed.is_error);
        assert!(!failed.is_loading);
    }

    #[test]
    fn test_error_fallbacks() {
        assert_eq!(
            query_error_message(&BeautiragError::http_error(500, None)),
            "Error: Failed to get response"
        );
        assert_eq!(
            query_error_message(&BeautiragError::transport_error("")),
            "Error: Network error"
        );
    }

    #[test]
    fn test_shift_enter_inserts_newline_and_grows_input() {
        let mut panel = ConversationPanel::new();
        let shift_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);

        panel.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE), &config());
        assert_eq!(panel.input_height(80), 1);

        for _ in 0..8 {
            assert!(panel.handle_key(shift_enter, &config()).is_none());
        }
        assert_eq!(panel.input(), "a\n\n\n\n\n\n\n\n");
        assert_eq!(panel.input_height(80), INPUT_MAX_LINES);

        let pending = panel
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &config())
            .unwrap();
        assert_eq!(pending.request.query, "a\n\n\n\n\n\n\n\n");
    }

    #[test]
    fn test_long_line_wraps_and_grows_input() {
        let mut panel = ConversationPanel::new();
        let question = format!("{} ENDMARK", vec!["word"; 30].join(" "));
        panel.set_input(&question);

        let lines = panel.input_lines(40);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
        assert!(lines.last().unwrap().ends_with("ENDMARK"));
        assert_eq!(panel.input_height(40), 4);
        assert_eq!(panel.input_height(10), INPUT_MAX_LINES);
        assert_eq!(panel.input_height(1000), 1);
    }

    #[test]
    fn test_scroll_is_clamped_to_transcript() {
        let mut panel = ConversationPanel::new();
        panel.set_scroll_limit(7);

        panel.scroll_up(5);
        panel.scroll_up(5);
        panel.scroll_up(5);
        assert_eq!(panel.scroll_from_bottom(), 7);

        panel.scroll_down(5);
        assert_eq!(panel.scroll_from_bottom(), 2);

        panel.scroll_up(5);
        panel.set_scroll_limit(3);
        panel.scroll_down(1);
        assert_eq!(panel.scroll_from_bottom(), 2);
    }

    #[test]
    fn test_alt_enter_inserts_newline() {
        let mut panel = ConversationPanel::new();
        panel.set_input("line one");
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);

        assert!(panel.handle_key(alt_enter, &config()).is_none());
        panel.handle_key(KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE), &config());
        assert_eq!(panel.input(), "line one\n2");
        assert!(panel.is_empty());
    }

    #[tokio::test]
    async fn test_simulated_backend_answer() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query/"))
            .and(body_json(json!({
                "query": "what is the answer",
                "model_name": "gpt-4o",
                "api_key": "sk-test"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "42" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let mut panel = ConversationPanel::new();
        panel.set_input("what is the answer");
        send(&mut panel, &client, &config()).await.unwrap();

        let messages: Vec<_> = panel.messages().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!((messages[0].sender, messages[0].text.as_str()), (Sender::User, "what is the answer"));
        assert_eq!((messages[1].sender, messages[1].text.as_str()), (Sender::Bot, "42"));
        assert!(messages.iter().all(|m| !m.is_loading));
        assert!(!panel.is_awaiting());
    }

    #[tokio::test]
    async fn test_simulated_backend_error_detail() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query/"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "detail": "index not ready" })),
            )
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let mut panel = ConversationPanel::new();
        panel.set_input("anything indexed?");
        let id = send(&mut panel, &client, &config()).await.unwrap();

        let reply = panel.message(id).unwrap();
        assert!(reply.text.contains("index not ready"));
        assert!(reply.text.starts_with("Error: "));
        assert!(!reply.is_loading);
        assert!(!panel.is_awaiting());
    }
}
