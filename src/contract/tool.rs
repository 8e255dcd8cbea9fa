use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extras::VendorExtras;

/// Extras key holding an unrecognised tool definition verbatim.
pub const ORIGINAL_TOOL_KEY: &str = "original_tool";
/// Extras key holding a structured tool choice verbatim.
pub const ORIGINAL_TOOL_CHOICE_KEY: &str = "original_tool_choice";
/// Extras key holding the full allowed-tools definitions verbatim.
pub const ORIGINAL_TOOLS_KEY: &str = "original_tools";
/// Extras key holding an unrecognised response format verbatim.
pub const ORIGINAL_RESPONSE_FORMAT_KEY: &str = "original_response_format";

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Function(FunctionTool),
    Custom(CustomTool),
    /// Tool executed by the vendor itself; the definition is kept under
    /// [`ORIGINAL_TOOL_KEY`].
    Hosted(HostedTool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input format (free text or grammar), passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
    pub extras: VendorExtras,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedTool {
    pub tool_type: String,
    pub extras: VendorExtras,
}

impl Tool {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function(tool) => Some(&tool.name),
            Self::Custom(tool) => Some(&tool.name),
            Self::Hosted(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoiceMode {
    Auto,
    None,
    Required,
}

impl ToolChoiceMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
            Self::Required => "required",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(Self::Auto),
            "none" => Some(Self::None),
            "required" => Some(Self::Required),
            _ => None,
        }
    }
}

/// Vendor-hosted tool families a choice can force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostedToolKind {
    WebSearch,
    FileSearch,
    CodeInterpreter,
    Mcp,
    Shell,
    ApplyPatch,
    ImageGeneration,
    Other(String),
}

impl HostedToolKind {
    #[must_use]
    pub fn from_type(raw: &str) -> Self {
        match raw {
            "web_search" | "web_search_preview" => Self::WebSearch,
            "file_search" => Self::FileSearch,
            "code_interpreter" => Self::CodeInterpreter,
            "mcp" => Self::Mcp,
            "shell" | "local_shell" => Self::Shell,
            "apply_patch" => Self::ApplyPatch,
            "image_generation" => Self::ImageGeneration,
            other => Self::Other(other.to_string()),
        }
    }
}

/// How the model should pick among the offered tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    Mode(ToolChoiceMode),
    Function {
        name: String,
        #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
        extras: VendorExtras,
    },
    Custom {
        name: String,
        #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
        extras: VendorExtras,
    },
    /// Restrict the model to a subset of the offered tools.
    AllowedTools {
        mode: ToolChoiceMode,
        tools: Vec<String>,
        #[serde(default, skip_serializing_if = "VendorExtras::is_empty")]
        extras: VendorExtras,
    },
    /// Anything else; the raw choice travels under [`ORIGINAL_TOOL_CHOICE_KEY`].
    Hosted {
        kind: HostedToolKind,
        extras: VendorExtras,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strict: Option<bool>,
    },
    /// Unrecognised format, kept under [`ORIGINAL_RESPONSE_FORMAT_KEY`].
    Other(VendorExtras),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_choice_mode_parse() {
        assert_eq!(ToolChoiceMode::parse("required"), Some(ToolChoiceMode::Required));
        assert_eq!(ToolChoiceMode::parse("sometimes"), None);
        assert_eq!(ToolChoiceMode::Auto.as_str(), "auto");
    }

    #[test]
    fn test_hosted_kind_aliases() {
        assert_eq!(
            HostedToolKind::from_type("web_search_preview"),
            HostedToolKind::WebSearch
        );
        assert_eq!(
            HostedToolKind::from_type("computer_use"),
            HostedToolKind::Other("computer_use".to_string())
        );
    }
}
