//! Pass-through to the external chat completion endpoint.
//!
//! Both coping tips and the wellness assistant go through the same
//! `POST /api/chat` call with different prompt templates. Neither ever
//! returns an error to the caller: failures are logged and replaced with a
//! fixed fallback text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::Mood;

pub const COPING_TIPS_CONTEXT: &str = "You are a mental health wellness assistant. Provide supportive, evidence-based coping strategies. Keep responses concise and practical.";

pub const COPING_TIPS_FALLBACK: &str =
    "Unable to get tips right now. Try some deep breathing or gentle movement.";

pub const ASSISTANT_CONTEXT: &str = "You are a wellness assistant for women's health. Provide helpful, supportive advice about health, fitness, nutrition, mental wellness, and lifestyle. Keep responses concise and encouraging.";

pub const ASSISTANT_FALLBACK: &str = "Error: Please try again later.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub message: &'a str,
    pub context: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, message: &str, context: &str) -> Result<String, CompletionError>;
}

/// Client for the chat endpoint using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestCompletionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ReqwestCompletionClient {
    /// `base_url` is the site root, e.g. `http://localhost:3000`; requests go to `{base_url}/api/chat`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for ReqwestCompletionClient {
    async fn complete(&self, message: &str, context: &str) -> Result<String, CompletionError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&CompletionRequest { message, context })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }

        let data: CompletionResponse = resp.json().await?;
        Ok(data.response)
    }
}

pub fn coping_tips_message(mood: Mood) -> String {
    format!(
        "I'm feeling {} today. Can you give me 3 specific, actionable coping strategies or wellness tips?",
        mood
    )
}

/// Ask for coping strategies for `mood`. Always yields displayable text.
pub async fn request_coping_tips<C>(client: &C, mood: Mood) -> String
where
    C: CompletionClient + ?Sized,
{
    match client
        .complete(&coping_tips_message(mood), COPING_TIPS_CONTEXT)
        .await
    {
        Ok(tips) => tips,
        Err(e) => {
            tracing::warn!(%mood, "coping tips request failed: {}", e);
            COPING_TIPS_FALLBACK.to_string()
        }
    }
}

/// Send a free-form question to the wellness assistant
pub async fn ask_assistant<C>(client: &C, message: &str) -> String
where
    C: CompletionClient + ?Sized,
{
    match client.complete(message, ASSISTANT_CONTEXT).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("assistant request failed: {}", e);
            ASSISTANT_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _message: &str, _context: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, message: &str, context: &str) -> Result<String, CompletionError> {
            self.calls
                .lock()
                .expect("lock")
                .push((message.to_string(), context.to_string()));
            Ok("1. Breathe".to_string())
        }
    }

    #[test]
    fn coping_message_names_the_mood() {
        assert_eq!(
            coping_tips_message(Mood::Stressed),
            "I'm feeling stressed today. Can you give me 3 specific, actionable coping strategies or wellness tips?"
        );
    }

    #[tokio::test]
    async fn failing_client_yields_fallback_tips() {
        let tips = request_coping_tips(&FailingClient, Mood::Sad).await;
        assert_eq!(tips, COPING_TIPS_FALLBACK);
    }

    #[tokio::test]
    async fn failing_client_yields_assistant_fallback() {
        let reply = ask_assistant(&FailingClient, "How much water?").await;
        assert_eq!(reply, ASSISTANT_FALLBACK);
    }

    #[tokio::test]
    async fn tips_use_the_coping_context() {
        let client = RecordingClient::default();
        let tips = request_coping_tips(&client, Mood::Tired).await;
        assert_eq!(tips, "1. Breathe");

        let calls = client.calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, coping_tips_message(Mood::Tired));
        assert_eq!(calls[0].1, COPING_TIPS_CONTEXT);
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let client: Box<dyn CompletionClient> = Box::new(FailingClient);
        let tips = request_coping_tips(client.as_ref(), Mood::Calm).await;
        assert_eq!(tips, COPING_TIPS_FALLBACK);
    }

    #[test]
    fn endpoint_is_built_from_base_url() {
        let client = ReqwestCompletionClient::new("http://localhost:3000/", Duration::from_secs(5))
            .expect("client");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/chat");
    }
}
