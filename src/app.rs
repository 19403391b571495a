use anyhow::{anyhow, Result};
use ratatui::layout::Rect;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{file_name_of, ChatResponse, ContractApi, Document, UploadResponse};
use crate::input::InputField;
use crate::state::{ChatMessage, SessionId};

pub const UPLOAD_FAILED: &str = "Error processing the new document";
pub const NOT_A_PDF: &str = "Only PDF documents are supported";
pub const CHAT_FAILED: &str = "There was a problem consulting the agent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Upload,
    Chat,
}

/// The single request the app may have in flight
enum Pending {
    Upload {
        file_name: String,
        task: JoinHandle<Result<UploadResponse>>,
    },
    Chat {
        task: JoinHandle<Result<ChatResponse>>,
    },
}

impl Pending {
    fn is_finished(&self) -> bool {
        match self {
            Pending::Upload { task, .. } => task.is_finished(),
            Pending::Chat { task } => task.is_finished(),
        }
    }
}

pub struct App {
    pub should_quit: bool,

    // Session state
    pub session_id: Option<SessionId>,
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub status: String,

    // Input state
    pub question: InputField,
    pub file_path: InputField,
    pub show_file_prompt: bool, // "change document" prompt over the chat

    // Transcript scrolling, dimensions updated during render
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_area: Option<Rect>,
    pub transcript_height: u16, // wrapped lines, measured during render
    pub follow_bottom: bool,

    pub animation_frame: u8, // 0-2 for ellipsis animation

    api: Arc<dyn ContractApi>,
    pending: Option<Pending>,
}

impl App {
    pub fn new(api: Arc<dyn ContractApi>) -> Self {
        Self {
            should_quit: false,
            session_id: None,
            messages: Vec::new(),
            loading: false,
            status: String::new(),
            question: InputField::default(),
            file_path: InputField::default(),
            show_file_prompt: false,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            transcript_height: 0,
            follow_bottom: true,
            animation_frame: 0,
            api,
            pending: None,
        }
    }

    /// No session means the upload screen; there is no other switch.
    pub fn screen(&self) -> Screen {
        if self.session_id.is_some() {
            Screen::Chat
        } else {
            Screen::Upload
        }
    }

    /// Start uploading the document at `path`.
    ///
    /// Ignored while another request is in flight. Anything but a `.pdf`
    /// is rejected here without contacting the backend.
    pub fn process_file(&mut self, path: impl AsRef<Path>) {
        if self.loading {
            return;
        }

        let path = resolve_path(path.as_ref());
        if !is_pdf(&path) {
            self.status = NOT_A_PDF.to_string();
            return;
        }

        let file_name = file_name_of(&path);
        info!(file = %file_name, "uploading contract");

        self.loading = true;
        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move {
            let document = Document::open(&path).await?;
            api.upload_contract(document).await
        });
        self.pending = Some(Pending::Upload { file_name, task });
    }

    /// Send the question field to the agent.
    ///
    /// Silently does nothing for a blank question, without a session, or
    /// while a request is in flight. The text goes out exactly as typed and
    /// the user message is appended before the request is issued.
    pub fn submit_question(&mut self) {
        let question = self.question.text().to_string();
        if question.trim().is_empty() || self.loading {
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            return;
        };

        self.messages.push(ChatMessage::user(question.clone()));
        self.question.clear();
        self.loading = true;
        self.scroll_to_bottom();

        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move { api.chat_with_agent(&question, &session_id).await });
        self.pending = Some(Pending::Chat { task });
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the in-flight request's outcome if it has completed.
    pub async fn poll_pending(&mut self) {
        if self.pending.as_ref().is_some_and(Pending::is_finished) {
            self.settle().await;
        }
    }

    /// Wait for the in-flight request, if any, and apply its outcome.
    pub async fn settle(&mut self) {
        match self.pending.take() {
            Some(Pending::Upload { file_name, task }) => {
                let result = join(task).await;
                self.apply_upload(&file_name, result);
            }
            Some(Pending::Chat { task }) => {
                let result = join(task).await;
                self.apply_chat(result);
            }
            None => {}
        }
    }

    pub fn apply_upload(&mut self, file_name: &str, result: Result<UploadResponse>) {
        let session_id = result.and_then(|response| {
            response
                .session_id
                .and_then(SessionId::new)
                .ok_or_else(|| anyhow!("upload response carried no session id"))
        });

        match session_id {
            Ok(session_id) => {
                info!(%session_id, file = %file_name, "contract indexed");
                self.session_id = Some(session_id);
                self.messages = vec![ChatMessage::assistant(welcome_message(file_name))];
                self.status.clear();
                self.file_path.clear();
                self.show_file_prompt = false;
                self.chat_scroll = 0;
                self.follow_bottom = true;
            }
            Err(e) => {
                warn!(file = %file_name, "upload failed: {:#}", e);
                self.status = UPLOAD_FAILED.to_string();
            }
        }
        self.loading = false;
    }

    pub fn apply_chat(&mut self, result: Result<ChatResponse>) {
        let content = match result {
            Ok(response) => response.answer,
            Err(e) => {
                warn!("chat failed: {:#}", e);
                CHAT_FAILED.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(content));
        self.loading = false;
        self.scroll_to_bottom();
    }

    pub fn open_file_prompt(&mut self) {
        if !self.loading {
            self.file_path.clear();
            self.show_file_prompt = true;
        }
    }

    pub fn close_file_prompt(&mut self) {
        self.show_file_prompt = false;
        self.file_path.clear();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_bottom = self.chat_scroll >= max;
    }

    /// Keep the newest message (or the loading indicator) in view from the
    /// next render on
    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.chat_scroll = self.max_scroll();
    }

    /// Record the wrapped height of the transcript as last rendered and
    /// clamp the scroll offset to it
    pub fn set_transcript_height(&mut self, total_lines: u16) {
        self.transcript_height = total_lines;
        let max = self.max_scroll();
        self.chat_scroll = if self.follow_bottom {
            max
        } else {
            self.chat_scroll.min(max)
        };
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_height.saturating_sub(self.chat_height)
    }
}

async fn join<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(anyhow!("request task failed: {}", e)),
    }
}

pub fn welcome_message(file_name: &str) -> String {
    format!(
        "**New contract loaded:** *{}*.\n\nI have indexed its clauses. How can I help you?",
        file_name
    )
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Expand a leading `~` to the home directory
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
