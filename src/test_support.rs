//! Shared fakes for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Result, SentimentError};
use crate::transport::{HttpCall, HttpReply, Transport};

/// Replays canned replies in order and records every call it receives.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply>>>,
    calls: Mutex<Vec<HttpCall>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<HttpReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: String) -> Self {
        Self::new(vec![Ok(HttpReply {
            status: 200,
            reason: Some("OK".to_string()),
            body,
        })])
    }

    pub fn reply(status: u16, body: &str) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string);
        Self::new(vec![Ok(HttpReply {
            status,
            reason,
            body: body.to_string(),
        })])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<HttpCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply> {
        self.calls.lock().unwrap().push(call.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(SentimentError::ProviderUnreachable(
                    "No more scripted replies".to_string(),
                ))
            })
    }
}

/// A chat-completion envelope whose assistant message is `content`.
pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
    .to_string()
}
