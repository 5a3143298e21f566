//! Recording stubs for the executor's outbound collaborators.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Token returned by [`StubTokenIssuer`] unless configured otherwise.
pub const DEFAULT_CANNED_TOKEN: &str = "mock-token";

/// A callback the executor hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequest {
    pub owner_id: String,
    pub message: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

pub trait CallbackSink: Send {
    fn send(&mut self, request: CallbackRequest) -> Result<()>;
}

pub trait TokenIssuer: Send {
    /// Issue a token for `subject`.
    fn generate(&mut self, subject: &str) -> SecretString;
}

/// Accepts every request and keeps them in order.
#[derive(Debug, Default)]
pub struct StubCallbackSink {
    calls: Vec<CallbackRequest>,
}

impl StubCallbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[CallbackRequest] {
        &self.calls
    }
}

impl CallbackSink for StubCallbackSink {
    fn send(&mut self, request: CallbackRequest) -> Result<()> {
        self.calls.push(request);
        Ok(())
    }
}

/// Returns the same token for every subject and logs who asked.
#[derive(Debug)]
pub struct StubTokenIssuer {
    token: SecretString,
    calls: Vec<String>,
}

impl Default for StubTokenIssuer {
    fn default() -> Self {
        Self::new(SecretString::from(DEFAULT_CANNED_TOKEN))
    }
}

impl StubTokenIssuer {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            calls: Vec::new(),
        }
    }

    /// Subjects tokens were issued for, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

impl TokenIssuer for StubTokenIssuer {
    fn generate(&mut self, subject: &str) -> SecretString {
        self.calls.push(subject.to_string());
        self.token.clone()
    }
}
