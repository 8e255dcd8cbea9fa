use serde::{Deserialize, Serialize};

use super::extras::{Extensions, VendorExtras};
use super::message::{Role, ToolCallKind};
use super::response::{FinishReason, ResponseUsage};

/// One vendor-neutral streaming event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEventContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Index of the choice / output item the event belongs to.
    #[serde(default)]
    pub output_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub payload: StreamEventPayload,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl StreamEventContract {
    #[must_use]
    pub fn new(payload: StreamEventPayload) -> Self {
        Self {
            response_id: None,
            message_id: None,
            output_index: 0,
            created: None,
            model: None,
            payload,
            extensions: Extensions::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StreamEventKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEventPayload {
    MessageStart(MessageStart),
    MessageDelta(MessageDelta),
    MessageStop(MessageStop),
    /// Terminal.
    Error(StreamError),
}

impl StreamEventPayload {
    #[must_use]
    pub const fn kind(&self) -> StreamEventKind {
        match self {
            Self::MessageStart(_) => StreamEventKind::MessageStart,
            Self::MessageDelta(_) => StreamEventKind::MessageDelta,
            Self::MessageStop(_) => StreamEventKind::MessageStop,
            Self::Error(_) => StreamEventKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventKind {
    MessageStart,
    MessageDelta,
    MessageStop,
    Error,
}

/// Opens a message. Never carries content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStart {
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallDelta>,
}

/// Closes a message. The only payload that carries usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// Incremental fragment of a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolCallKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}
