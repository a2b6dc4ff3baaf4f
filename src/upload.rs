// src/upload.rs

use crate::api::{BackendClient, UploadFile, UploadResponse};
use crate::constants::{MSG_UNKNOWN_ERROR, MSG_UPLOADING, MSG_UPLOAD_FAILED, MSG_UPLOAD_OK};
use crate::errors::{BeautiragError, BeautiragResult};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};

/// Accepted MIME types and the extensions that map to them.
pub const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    ("text/plain", &["txt"]),
    ("application/pdf", &["pdf"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    ("image/png", &["png"]),
    ("image/jpeg", &["jpeg", "jpg"]),
    ("audio/mpeg", &["mp3"]),
    ("audio/wav", &["wav"]),
];

pub const SUPPORTED_LABEL: &str = "Supported: TXT, PDF, DOCX, PNG, JPEG, MP3, WAV";

/// MIME type of an allowed file, `None` for anything outside the allow-list.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(_, exts)| exts.iter().any(|e| *e == ext))
        .map(|(mime, _)| *mime)
}

/// Splits what a terminal pastes on drag-and-drop into paths.
///
/// Handles whitespace separation, single/double quotes, backslash-escaped
/// characters and `file://` prefixes.
pub fn parse_dropped_paths(input: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }

    paths
        .into_iter()
        .map(|p| PathBuf::from(p.strip_prefix("file://").unwrap_or(&p)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFile {
    pub name: String,
    pub size: u64,
}

impl QueuedFile {
    pub fn size_kb(&self) -> u64 {
        (self.size as f64 / 1024.0).round() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

/// An accepted file waiting to be read and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub name: String,
    pub mime: &'static str,
}

/// Files that passed the allow-list and go out as one multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    pub entries: Vec<BatchEntry>,
}

impl UploadBatch {
    /// Reads every file of the batch from disk.
    pub async fn load(&self) -> BeautiragResult<Vec<UploadFile>> {
        let mut files = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let bytes = tokio::fs::read(&entry.path).await?;
            files.push(UploadFile {
                name: entry.name.clone(),
                mime: entry.mime,
                bytes,
            });
        }
        Ok(files)
    }

    /// Reads and submits the batch.
    pub async fn send(self, client: &BackendClient) -> BeautiragResult<UploadResponse> {
        let files = self.load().await?;
        client.upload(files).await
    }
}

/// Document upload pane state.
#[derive(Debug)]
pub struct UploadPanel {
    input: String,
    queue: Vec<QueuedFile>,
    rejected: Vec<String>,
    status: UploadStatus,
    message: String,
}

impl Default for UploadPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPanel {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            queue: Vec::new(),
            rejected: Vec::new(),
            status: UploadStatus::Idle,
            message: String::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn queue(&self) -> &[QueuedFile] {
        &self.queue
    }

    /// Names dropped by the last batch because of their type or a read error.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }

    /// Filters a dropped batch, queues what is allowed and marks the panel as
    /// uploading. Returns `None` when nothing is left to send.
    pub fn accept(&mut self, paths: &[PathBuf]) -> Option<UploadBatch> {
        self.rejected.clear();
        let mut entries = Vec::new();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let Some(mime) = mime_for_path(path) else {
                log::info!("{}", BeautiragError::UnsupportedFile { name: name.clone() });
                self.rejected.push(name);
                continue;
            };

            match std::fs::metadata(path) {
                Ok(meta) if meta.is_file() => {
                    self.queue.push(QueuedFile {
                        name: name.clone(),
                        size: meta.len(),
                    });
                    entries.push(BatchEntry {
                        path: path.clone(),
                        name,
                        mime,
                    });
                }
                Ok(_) => {
                    log::info!("rejecting {}: not a regular file", path.display());
                    self.rejected.push(name);
                }
                Err(e) => {
                    log::info!("rejecting {}: {}", path.display(), e);
                    self.rejected.push(name);
                }
            }
        }

        if entries.is_empty() {
            return None;
        }

        self.status = UploadStatus::Uploading;
        self.message = MSG_UPLOADING.to_string();
        log::info!("uploading {} file(s)", entries.len());
        Some(UploadBatch { entries })
    }

    /// Takes the typed/pasted paths out of the input and accepts them.
    pub fn submit_input(&mut self) -> Option<UploadBatch> {
        let paths = parse_dropped_paths(&std::mem::take(&mut self.input));
        if paths.is_empty() {
            return None;
        }
        self.accept(&paths)
    }

    /// Records the outcome of a batch. The queue is left as it is either way.
    pub fn settle(&mut self, result: BeautiragResult<UploadResponse>) {
        match result {
            Ok(response) => {
                self.status = UploadStatus::Success;
                let mut message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_UPLOAD_OK.to_string());
                if !response.failed_files.is_empty() {
                    message.push_str(&format!(" Failed: {}", response.failed_files.join(", ")));
                }
                self.message = message;
            }
            Err(err) => {
                log::warn!("upload failed: {}", err);
                self.status = UploadStatus::Error;
                self.message = upload_error_message(&err);
            }
        }
    }

    pub fn paste(&mut self, text: &str) {
        if !self.input.is_empty() && !self.input.ends_with(' ') {
            self.input.push(' ');
        }
        self.input.push_str(text.trim_end_matches(['\r', '\n']));
    }

    /// Key handling while the pane has focus.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UploadBatch> {
        match key.code {
            KeyCode::Enter => return self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
        None
    }
}

fn upload_error_message(err: &BeautiragError) -> String {
    match err {
        BeautiragError::Http { detail, .. } => detail
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| MSG_UPLOAD_FAILED.to_string()),
        BeautiragError::Transport(msg) if !msg.is_empty() => msg.clone(),
        BeautiragError::Transport(_) => MSG_UNKNOWN_ERROR.to_string(),
        other => other.to_string(),
    }
}
