//! Request types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal identifier of one unit of work (0..request_count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(pub usize);

impl WorkItem {
    /// Ordinal index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for WorkItem {
    fn from(index: usize) -> Self {
        WorkItem(index)
    }
}

/// A single streaming generation request handed to a [`crate::RequestIssuer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Work item this request fulfils
    pub work_item: WorkItem,

    /// Target model identifier
    pub model: String,

    /// Full prompt text sent as a single user message
    pub prompt: String,

    /// Generation cap
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    /// Create a request
    pub fn new(
        work_item: WorkItem,
        model: impl Into<String>,
        prompt: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            work_item,
            model: model.into(),
            prompt: prompt.into(),
            max_output_tokens,
        }
    }

    /// Chat messages for this request
    pub fn messages(&self) -> Vec<Message> {
        vec![Message::user(self.prompt.clone())]
    }
}

/// Chat message (OpenAI-compatible format)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// Input
    User,
    /// Output
    Assistant,
}
