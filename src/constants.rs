// UI Constants

pub const APP_TITLE: &str = "BeautiRAG";

/// Text lines the chat input may grow to before it starts scrolling.
pub const INPUT_MAX_LINES: u16 = 5;

pub const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
pub const TICK_RATE_MS: u64 = 100;

// Backend Constants
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const UPLOAD_ENDPOINT: &str = "/upload/";
pub const QUERY_ENDPOINT: &str = "/query/";
pub const HEALTH_ENDPOINT: &str = "/";
pub const UPLOAD_FIELD: &str = "files";

// Model Constants
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const VALIDATION_MESSAGE_TTL_SECS: u64 = 5;

// Messages shown to the user
pub const MSG_KEY_REQUIRED: &str = "API key is required for this model.";
pub const MSG_CONFIG_APPLIED: &str = "Configuration applied successfully!";
pub const MSG_UPLOADING: &str = "Uploading...";
pub const MSG_UPLOAD_OK: &str = "Files uploaded successfully!";
pub const MSG_UPLOAD_FAILED: &str = "Upload failed";
pub const MSG_UNKNOWN_ERROR: &str = "An unknown error occurred";
pub const MSG_QUERY_FAILED: &str = "Failed to get response";
pub const MSG_NETWORK_ERROR: &str = "Network error";
pub const LOADING_PLACEHOLDER: &str = "...";
