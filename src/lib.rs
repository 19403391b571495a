pub mod api;
pub mod app;
pub mod config;
pub mod handler;
pub mod input;
pub mod logging;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{ChatResponse, ContractApi, Document, HttpApi, UploadResponse};
pub use app::{App, Screen};
pub use config::Config;
pub use state::{ChatMessage, ChatRole, SessionId};
