// Endpoint
pub const CHAT_PATH: &str = "/chat";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

// Shown in place of a bot reply whenever an exchange fails.
pub const RESPONSE_UNAVAILABLE: &str = "Error: Unable to get a response.";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
// Stderr shares the terminal with the transcript.
pub const STDERR_LOG_LEVEL: &str = "warn";
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
pub const APP_DIR_NAME: &str = "chatline";

// UI
pub const APP_TITLE: &str = "chatline";
pub const SEND_BUTTON_LABEL: &str = "[ Send ]";
pub const USER_PREFIX: &str = "you> ";
pub const BOT_PREFIX: &str = "bot> ";
