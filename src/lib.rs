// src/lib.rs

pub mod api;
pub mod app;
pub mod chat_message;
pub mod chat_view;
pub mod config;
pub mod constants;
pub mod controller;
pub mod conversation;
pub mod errors;
pub mod key_handlers;
pub mod logging;
pub mod models;
pub mod plain;
pub mod status_indicator;
pub mod ui;

pub use app::{App, AppState};
pub use controller::ChatController;
pub use errors::{ChatError, ChatResult};
pub use models::{Message, Sender};
