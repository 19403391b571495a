use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::state::SessionId;

/// A contract read from disk, ready to be uploaded
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub async fn open(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Could not read {}", path.display()))?;

        Ok(Self {
            file_name: file_name_of(path),
            bytes,
        })
    }
}

/// Final path component, or the whole path if it has none
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    pub status: Option<String>,
    pub session_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub session_id: Option<String>,
}

/// The two calls the contract agent backend exposes
#[async_trait]
pub trait ContractApi: Send + Sync {
    /// `POST /upload` with the document as multipart field `file`
    async fn upload_contract(&self, document: Document) -> Result<UploadResponse>;

    /// `POST /chat?question=..&session_id=..` with an empty body
    async fn chat_with_agent(
        &self,
        question: &str,
        session_id: &SessionId,
    ) -> Result<ChatResponse>;
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ContractApi for HttpApi {
    async fn upload_contract(&self, document: Document) -> Result<UploadResponse> {
        let url = self.endpoint("upload");
        debug!(%url, file = %document.file_name, bytes = document.bytes.len(), "uploading contract");

        let part = multipart::Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Upload request failed with status {}: {}", status, text));
        }

        let upload_response: UploadResponse = response.json().await?;
        Ok(upload_response)
    }

    async fn chat_with_agent(
        &self,
        question: &str,
        session_id: &SessionId,
    ) -> Result<ChatResponse> {
        let url = self.endpoint("chat");
        debug!(%url, %session_id, "asking agent");

        let response = self
            .client
            .post(&url)
            .query(&[("question", question), ("session_id", session_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Chat request failed with status {}: {}", status, text));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}
