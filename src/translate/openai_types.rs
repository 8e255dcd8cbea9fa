//! Type definitions for the [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).
//!
//! These types represent the request format, the non-streaming response and
//! the streaming chunks. Every object keeps the keys it does not declare in a
//! flattened `extra` bag, and declares its own keys through [`KnownFields`].
//! Unions whose vendor side keeps growing (content parts, tools, tool choice,
//! tool calls, response formats, annotations) fall back to a `Raw(Value)` arm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::extras::{ExtraFields, KnownFields};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<ChatStreamOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<ChatStop>,
    /// Deprecated in favour of `max_completion_tokens`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Token IDs as decimal strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ChatToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ChatResponseFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCompletionRequest {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "model",
        "messages",
        "temperature",
        "top_p",
        "n",
        "stream",
        "stream_options",
        "stop",
        "max_tokens",
        "max_completion_tokens",
        "presence_penalty",
        "frequency_penalty",
        "logit_bias",
        "logprobs",
        "top_logprobs",
        "seed",
        "user",
        "tools",
        "tool_choice",
        "parallel_tool_calls",
        "response_format",
        "metadata",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatStreamOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_usage: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatStreamOptions {
    const KNOWN_FIELDS: &'static [&'static str] = &["include_usage"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatStop {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ChatContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatMessage {
    const KNOWN_FIELDS: &'static [&'static str] =
        &["role", "content", "name", "tool_calls", "tool_call_id"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContentPart {
    Known(KnownContentPart),
    /// Unrecognised or malformed part, kept verbatim.
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownContentPart {
    Text(ChatTextPart),
    ImageUrl(ChatImagePart),
    InputAudio(ChatAudioPart),
    File(ChatFilePart),
    Refusal(ChatRefusalPart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTextPart {
    pub text: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatTextPart {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "text"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatImagePart {
    pub image_url: ChatImageUrl,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatImagePart {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "image_url"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatImageUrl {
    const KNOWN_FIELDS: &'static [&'static str] = &["url", "detail"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAudioPart {
    pub input_audio: ChatInputAudio,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatAudioPart {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "input_audio"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInputAudio {
    pub data: String,
    pub format: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatInputAudio {
    const KNOWN_FIELDS: &'static [&'static str] = &["data", "format"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFilePart {
    pub file: ChatFileRef,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFilePart {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "file"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFileRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFileRef {
    const KNOWN_FIELDS: &'static [&'static str] = &["file_id", "file_data", "filename"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRefusalPart {
    pub refusal: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatRefusalPart {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "refusal"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTool {
    Known(KnownChatTool),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownChatTool {
    Function(ChatFunctionTool),
    Custom(ChatCustomTool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionTool {
    pub function: ChatFunctionDef,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFunctionTool {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "function"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFunctionDef {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "description", "parameters", "strict"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCustomTool {
    pub custom: ChatCustomDef,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCustomTool {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "custom"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCustomDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCustomDef {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "description", "format"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatToolChoice {
    /// `"auto"`, `"none"`, `"required"`.
    Mode(String),
    Named(ChatNamedToolChoice),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatNamedToolChoice {
    Function(ChatFunctionChoice),
    Custom(ChatCustomChoice),
    AllowedTools(ChatAllowedToolsChoice),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionChoice {
    pub function: ChatToolName,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFunctionChoice {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "function"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCustomChoice {
    pub custom: ChatToolName,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCustomChoice {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "custom"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolName {
    pub name: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatToolName {
    const KNOWN_FIELDS: &'static [&'static str] = &["name"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAllowedToolsChoice {
    pub allowed_tools: ChatAllowedTools,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatAllowedToolsChoice {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "allowed_tools"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAllowedTools {
    /// `"auto"` or `"required"`.
    pub mode: String,
    pub tools: Vec<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatAllowedTools {
    const KNOWN_FIELDS: &'static [&'static str] = &["mode", "tools"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponseFormat {
    Known(KnownResponseFormat),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownResponseFormat {
    Text,
    JsonObject,
    JsonSchema { json_schema: ChatJsonSchema },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatJsonSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatJsonSchema {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "description", "schema", "strict"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatToolCall {
    Known(KnownChatToolCall),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownChatToolCall {
    Function(ChatFunctionToolCall),
    Custom(ChatCustomToolCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionToolCall {
    pub id: String,
    pub function: ChatFunctionCall,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFunctionToolCall {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "id", "function"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    pub arguments: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatFunctionCall {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "arguments"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCustomToolCall {
    pub id: String,
    pub custom: ChatCustomCall,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCustomToolCall {
    const KNOWN_FIELDS: &'static [&'static str] = &["type", "id", "custom"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCustomCall {
    pub name: String,
    #[serde(default)]
    pub input: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCustomCall {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "input"];
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCompletionResponse {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "id",
        "object",
        "created",
        "model",
        "choices",
        "usage",
        "service_tier",
        "system_fingerprint",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<ChatLogprobs>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for Choice {
    const KNOWN_FIELDS: &'static [&'static str] =
        &["index", "message", "finish_reason", "logprobs"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<ChatAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    /// Deprecated single-call form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<ChatFunctionCall>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChoiceMessage {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "role",
        "content",
        "refusal",
        "annotations",
        "tool_calls",
        "function_call",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatAnnotation {
    Known(KnownAnnotation),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownAnnotation {
    UrlCitation { url_citation: ChatUrlCitation },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatUrlCitation {
    pub start_index: u64,
    pub end_index: u64,
    pub url: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatUrlCitation {
    const KNOWN_FIELDS: &'static [&'static str] = &["start_index", "end_index", "url", "title"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatLogprobs {
    #[serde(default)]
    pub content: Option<Vec<ChatTokenLogprob>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<Vec<ChatTokenLogprob>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatLogprobs {
    const KNOWN_FIELDS: &'static [&'static str] = &["content", "refusal"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTokenLogprob {
    pub token: String,
    pub logprob: f64,
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub top_logprobs: Vec<ChatTopLogprob>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatTokenLogprob {
    const KNOWN_FIELDS: &'static [&'static str] = &["token", "logprob", "bytes", "top_logprobs"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTopLogprob {
    pub token: String,
    pub logprob: f64,
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatTopLogprob {
    const KNOWN_FIELDS: &'static [&'static str] = &["token", "logprob", "bytes"];
}

/// Token counts. Detail blocks (`prompt_tokens_details`, ...) land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatUsage {
    const KNOWN_FIELDS: &'static [&'static str] =
        &["prompt_tokens", "completion_tokens", "total_tokens"];
}

// ---------------------------------------------------------------------------
// Streaming chunk types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatCompletionChunk {
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "id",
        "object",
        "created",
        "model",
        "choices",
        "usage",
        "service_tier",
        "system_fingerprint",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChunkChoice {
    const KNOWN_FIELDS: &'static [&'static str] = &["index", "delta", "finish_reason", "logprobs"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
    /// Deprecated single-call form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<ChunkFunction>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChunkDelta {
    const KNOWN_FIELDS: &'static [&'static str] =
        &["role", "content", "refusal", "tool_calls", "function_call"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkToolCall {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<ChunkFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<ChunkCustom>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChunkToolCall {
    const KNOWN_FIELDS: &'static [&'static str] = &["index", "id", "type", "function", "custom"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChunkFunction {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "arguments"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChunkCustom {
    const KNOWN_FIELDS: &'static [&'static str] = &["name", "input"];
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    pub error: ChatError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatError {
    pub message: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub error_type: Option<String>,
    /// String on most providers, occasionally an integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl KnownFields for ChatError {
    const KNOWN_FIELDS: &'static [&'static str] = &["message", "type", "code", "param"];
}

impl ChatError {
    /// `code` rendered as a string, whatever its JSON type.
    #[must_use]
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref()? {
            Value::Null => None,
            Value::String(code) => Some(code.clone()),
            other => Some(other.to_string()),
        }
    }
}
