use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extras::VendorExtras;

/// Extras key under which an unrecognised content part travels verbatim.
pub const ORIGINAL_PART_KEY: &str = "original_part";

/// Extras key under which a tool call of an unrecognised type travels verbatim.
pub const ORIGINAL_TOOL_CALL_KEY: &str = "original_tool_call";

/// Role of a message author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
    Tool,
    /// Deprecated function-result role.
    Function,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Developer => "developer",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Function => "function",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "system" => Self::System,
            "developer" => Self::Developer,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            "function" => Self::Function,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// ID of the tool call a tool-role message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

impl Message {
    /// Plain-text message with no tool calls.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            name: None,
            content: Some(Content::Text(text.into())),
            tool_calls: Vec::new(),
            tool_call_id: None,
            extras: VendorExtras::default(),
        }
    }
}

/// Message content: plain text or ordered typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    Text(TextPart),
    Image(ImagePart),
    Audio(AudioPart),
    File(FilePart),
    Refusal(RefusalPart),
    /// A part type with no contract slot; the original part is kept under
    /// [`ORIGINAL_PART_KEY`] in the extras.
    Unknown(UnknownPart),
}

impl ContentPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart {
            text: text.into(),
            annotations: Vec::new(),
            extras: VendorExtras::default(),
        })
    }

    /// Discriminant as it appears on the wire of the originating vendor.
    #[must_use]
    pub fn part_type(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Audio(_) => "audio",
            Self::File(_) => "file",
            Self::Refusal(_) => "refusal",
            Self::Unknown(part) => &part.part_type,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(part) => Some(&part.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    /// Citations and similar metadata attached to this span of text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePart {
    /// URL or base64 data URI.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPart {
    /// Base64-encoded audio.
    pub data: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalPart {
    pub refusal: String,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownPart {
    pub part_type: String,
    pub extras: VendorExtras,
}

/// Metadata attached to a text part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    UrlCitation(UrlCitation),
    /// Annotation type with no contract slot, kept verbatim.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlCitation {
    pub start_index: u64,
    pub end_index: u64,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

/// Kind of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallKind {
    Function,
    Custom,
}

/// A tool invocation recorded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub kind: ToolCallKind,
    pub name: String,
    /// JSON-encoded arguments for functions, free-form input for custom tools.
    pub arguments: String,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_raw_names() {
        assert_eq!(Role::from("developer"), Role::Developer);
        assert_eq!(Role::from("critic"), Role::Other("critic".to_string()));
        assert_eq!(Role::Other("critic".to_string()).as_str(), "critic");
        assert_eq!(
            serde_json::to_value(Role::Assistant).unwrap(),
            serde_json::json!("assistant")
        );
    }
}
