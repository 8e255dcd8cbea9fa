//! Translate Chat Completions requests to and from [`RequestContract`].
//!
//! Handles the leading system message, multi-part content, tools and tool
//! choice, the `max_tokens` / `max_completion_tokens` alias and `logit_bias`
//! key parsing. Anything without a contract slot travels in the extras.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::openai_types::{
    ChatAllowedTools, ChatAllowedToolsChoice, ChatAudioPart, ChatCompletionRequest, ChatContent,
    ChatContentPart, ChatCustomCall, ChatCustomChoice, ChatCustomDef, ChatCustomTool,
    ChatCustomToolCall, ChatFilePart, ChatFileRef, ChatFunctionCall, ChatFunctionChoice,
    ChatFunctionDef, ChatFunctionTool, ChatFunctionToolCall, ChatImagePart, ChatImageUrl,
    ChatInputAudio, ChatJsonSchema, ChatMessage, ChatNamedToolChoice, ChatRefusalPart,
    ChatResponseFormat, ChatStop, ChatStreamOptions, ChatTextPart, ChatTool, ChatToolCall,
    ChatToolChoice, ChatToolName, KnownChatTool, KnownChatToolCall, KnownContentPart,
    KnownResponseFormat,
};
use super::{
    inbound_extras, inbound_nested_extras, outbound_extras, outbound_nested_extras, VENDOR,
};
use crate::config::RequestConfig;
use crate::contract::message::{ORIGINAL_PART_KEY, ORIGINAL_TOOL_CALL_KEY};
use crate::contract::tool::{
    ORIGINAL_RESPONSE_FORMAT_KEY, ORIGINAL_TOOLS_KEY, ORIGINAL_TOOL_CHOICE_KEY, ORIGINAL_TOOL_KEY,
};
use crate::contract::{
    AudioPart, Content, ContentPart, CustomTool, FilePart, FunctionTool, HostedTool,
    HostedToolKind, ImagePart, Message, RefusalPart, RequestContract, ResponseFormat, Role,
    SamplingParams, StopCondition, StreamOptions, SystemInstruction, TextPart, Tool, ToolCall,
    ToolCallKind, ToolChoice, ToolChoiceMode, UnknownPart, VendorExtras,
};
use crate::error::{Result, TranslateError};
use crate::logging::{self, LogSink, SharedSink};

const COMPONENT: &str = "request";

/// Set on request extras when the inbound request limited tokens only through
/// the deprecated `max_tokens`.
pub const LEGACY_MAX_TOKENS_KEY: &str = "legacy_max_tokens";

/// Request translator for the Chat Completions dialect.
#[derive(Clone)]
pub struct RequestTranslator {
    config: RequestConfig,
    log: SharedSink,
}

impl Default for RequestTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RequestConfig::default(),
            log: logging::noop(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, log: SharedSink) -> Self {
        self.log = log;
        self
    }

    /// Ingest a vendor request.
    pub fn to_contract(&self, req: &ChatCompletionRequest) -> Result<RequestContract> {
        let (system, rest) = match req.messages.split_first() {
            Some((first, rest)) if is_leading_system(first) => {
                (Some(self.system_from_wire(first)), rest)
            }
            _ => (None, req.messages.as_slice()),
        };

        let messages = rest.iter().map(|m| self.message_from_wire(m)).collect();

        let tools = req
            .tools
            .iter()
            .flatten()
            .map(|t| self.tool_from_wire(t))
            .collect();

        let tool_choice = req
            .tool_choice
            .as_ref()
            .map(|c| self.tool_choice_from_wire(c))
            .transpose()?;

        let response_format = req
            .response_format
            .as_ref()
            .map(response_format_from_wire)
            .transpose()?;

        let sampling = SamplingParams {
            temperature: req.temperature,
            top_p: req.top_p,
            frequency_penalty: req.frequency_penalty,
            presence_penalty: req.presence_penalty,
            seed: req.seed,
            max_output_tokens: req.max_completion_tokens.or(req.max_tokens),
            candidate_count: req.n,
            stop: req.stop.as_ref().map(|stop| match stop {
                ChatStop::Single(s) => StopCondition::Single(s.clone()),
                ChatStop::Multiple(v) => StopCondition::Multiple(v.clone()),
            }),
            logit_bias: req.logit_bias.as_ref().map(|bias| self.parse_logit_bias(bias)),
            logprobs: req.logprobs,
            top_logprobs: req.top_logprobs,
        };

        let mut extras = inbound_extras(&req.extra);
        if req.max_completion_tokens.is_none() && req.max_tokens.is_some() {
            extras.insert(VENDOR, LEGACY_MAX_TOKENS_KEY, Value::Bool(true));
        }

        Ok(RequestContract {
            model: req.model.clone(),
            messages,
            prompt: None,
            system,
            sampling,
            stream: req.stream,
            stream_options: req.stream_options.as_ref().map(|o| StreamOptions {
                include_usage: o.include_usage,
                extras: inbound_extras(&o.extra),
            }),
            tools,
            tool_choice,
            parallel_tool_calls: req.parallel_tool_calls,
            response_format,
            user: req.user.clone(),
            metadata: req.metadata.clone().unwrap_or_default(),
            extras,
        })
    }

    /// Materialize a vendor request.
    pub fn from_contract(&self, contract: &RequestContract) -> Result<ChatCompletionRequest> {
        let mut messages = Vec::with_capacity(contract.messages.len() + 1);

        if let Some(system) = &contract.system {
            messages.push(ChatMessage {
                role: Role::System.to_string(),
                content: Some(self.content_to_wire(&system.content)),
                name: system.name.clone(),
                tool_calls: None,
                tool_call_id: None,
                extra: outbound_extras::<ChatMessage>(&system.extras, &[], self.log.as_ref()),
            });
        }

        for message in &contract.messages {
            messages.push(self.message_to_wire(message));
        }

        if contract.messages.is_empty() {
            if let Some(prompt) = &contract.prompt {
                messages.push(ChatMessage {
                    role: Role::User.to_string(),
                    content: Some(ChatContent::Text(prompt.clone())),
                    name: None,
                    tool_calls: None,
                    tool_call_id: None,
                    extra: Default::default(),
                });
            }
        }

        let tools = contract
            .tools
            .iter()
            .map(|t| self.tool_to_wire(t))
            .collect::<Result<Vec<_>>>()?;

        let tool_choice = contract
            .tool_choice
            .as_ref()
            .map(|c| self.tool_choice_to_wire(c))
            .transpose()?;

        let response_format = contract
            .response_format
            .as_ref()
            .map(response_format_to_wire)
            .transpose()?;

        let sampling = &contract.sampling;
        let legacy_max_tokens =
            self.config.legacy_max_tokens || contract.extras.flag(VENDOR, LEGACY_MAX_TOKENS_KEY);
        let (max_tokens, max_completion_tokens) = if legacy_max_tokens {
            (sampling.max_output_tokens, None)
        } else {
            (None, sampling.max_output_tokens)
        };

        let stream_options = match &contract.stream_options {
            Some(options) => Some(ChatStreamOptions {
                include_usage: options.include_usage,
                extra: outbound_extras::<ChatStreamOptions>(
                    &options.extras,
                    &[],
                    self.log.as_ref(),
                ),
            }),
            None if self.config.include_usage_default && contract.stream == Some(true) => {
                Some(ChatStreamOptions {
                    include_usage: Some(true),
                    extra: Default::default(),
                })
            }
            None => None,
        };

        Ok(ChatCompletionRequest {
            model: contract.model.clone(),
            messages,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            n: sampling.candidate_count,
            stream: contract.stream,
            stream_options,
            stop: sampling.stop.as_ref().map(|stop| match stop {
                StopCondition::Single(s) => ChatStop::Single(s.clone()),
                StopCondition::Multiple(v) => ChatStop::Multiple(v.clone()),
            }),
            max_tokens,
            max_completion_tokens,
            presence_penalty: sampling.presence_penalty,
            frequency_penalty: sampling.frequency_penalty,
            logit_bias: sampling.logit_bias.as_ref().map(|bias| {
                bias.iter()
                    .map(|(token, value)| (token.to_string(), *value))
                    .collect()
            }),
            logprobs: sampling.logprobs,
            top_logprobs: sampling.top_logprobs,
            seed: sampling.seed,
            user: contract.user.clone(),
            tools: (!tools.is_empty()).then_some(tools),
            tool_choice,
            parallel_tool_calls: contract.parallel_tool_calls,
            response_format,
            metadata: (!contract.metadata.is_empty()).then(|| contract.metadata.clone()),
            extra: outbound_extras::<ChatCompletionRequest>(
                &contract.extras,
                &[LEGACY_MAX_TOKENS_KEY],
                self.log.as_ref(),
            ),
        })
    }

    fn parse_logit_bias(&self, bias: &BTreeMap<String, f64>) -> BTreeMap<i64, f64> {
        bias.iter()
            .filter_map(|(token, value)| match token.parse::<i64>() {
                Ok(id) => Some((id, *value)),
                Err(_) => {
                    self.log.debug(
                        COMPONENT,
                        format!("dropping logit_bias entry with non-integer token id '{token}'"),
                    );
                    None
                }
            })
            .collect()
    }

    // -- messages ------------------------------------------------------------

    fn system_from_wire(&self, msg: &ChatMessage) -> SystemInstruction {
        SystemInstruction {
            content: msg
                .content
                .as_ref()
                .map_or_else(|| Content::Text(String::new()), |c| self.content_from_wire(c)),
            name: msg.name.clone(),
            extras: inbound_extras(&msg.extra),
        }
    }

    fn message_from_wire(&self, msg: &ChatMessage) -> Message {
        Message {
            role: Role::from(msg.role.as_str()),
            name: msg.name.clone(),
            content: msg.content.as_ref().map(|c| self.content_from_wire(c)),
            tool_calls: msg
                .tool_calls
                .iter()
                .flatten()
                .map(tool_call_from_wire)
                .collect(),
            tool_call_id: msg.tool_call_id.clone(),
            extras: inbound_extras(&msg.extra),
        }
    }

    fn message_to_wire(&self, msg: &Message) -> ChatMessage {
        let tool_calls: Vec<ChatToolCall> = msg
            .tool_calls
            .iter()
            .map(|tc| tool_call_to_wire(tc, self.log.as_ref()))
            .collect();

        ChatMessage {
            role: msg.role.to_string(),
            content: msg.content.as_ref().map(|c| self.content_to_wire(c)),
            name: msg.name.clone(),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: msg.tool_call_id.clone(),
            extra: outbound_extras::<ChatMessage>(&msg.extras, &[], self.log.as_ref()),
        }
    }

    fn content_from_wire(&self, content: &ChatContent) -> Content {
        match content {
            ChatContent::Text(text) => Content::Text(text.clone()),
            ChatContent::Parts(parts) => {
                Content::Parts(parts.iter().map(|p| self.part_from_wire(p)).collect())
            }
        }
    }

    fn content_to_wire(&self, content: &Content) -> ChatContent {
        match content {
            Content::Text(text) => ChatContent::Text(text.clone()),
            Content::Parts(parts) => {
                ChatContent::Parts(parts.iter().filter_map(|p| self.part_to_wire(p)).collect())
            }
        }
    }

    fn part_from_wire(&self, part: &ChatContentPart) -> ContentPart {
        match part {
            ChatContentPart::Known(KnownContentPart::Text(p)) => ContentPart::Text(TextPart {
                text: p.text.clone(),
                annotations: Vec::new(),
                extras: inbound_extras(&p.extra),
            }),
            ChatContentPart::Known(KnownContentPart::ImageUrl(p)) => ContentPart::Image(ImagePart {
                url: p.image_url.url.clone(),
                detail: p.image_url.detail.clone(),
                extras: inbound_nested_extras(&p.extra, &p.image_url.extra),
            }),
            ChatContentPart::Known(KnownContentPart::InputAudio(p)) => {
                ContentPart::Audio(AudioPart {
                    data: p.input_audio.data.clone(),
                    format: p.input_audio.format.clone(),
                    extras: inbound_nested_extras(&p.extra, &p.input_audio.extra),
                })
            }
            ChatContentPart::Known(KnownContentPart::File(p)) => ContentPart::File(FilePart {
                file_id: p.file.file_id.clone(),
                file_data: p.file.file_data.clone(),
                filename: p.file.filename.clone(),
                extras: inbound_nested_extras(&p.extra, &p.file.extra),
            }),
            ChatContentPart::Known(KnownContentPart::Refusal(p)) => {
                ContentPart::Refusal(RefusalPart {
                    refusal: p.refusal.clone(),
                    extras: inbound_extras(&p.extra),
                })
            }
            ChatContentPart::Raw(raw) => {
                let part_type = raw
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                self.log.debug(
                    COMPONENT,
                    format!("keeping content part of type '{part_type}' verbatim"),
                );
                ContentPart::Unknown(UnknownPart {
                    part_type,
                    extras: VendorExtras::single(VENDOR, ORIGINAL_PART_KEY, raw.clone()),
                })
            }
        }
    }

    fn part_to_wire(&self, part: &ContentPart) -> Option<ChatContentPart> {
        let log = self.log.as_ref();
        let known = match part {
            ContentPart::Text(p) => {
                if !p.annotations.is_empty() {
                    log.debug(
                        COMPONENT,
                        "dropping annotations on a request text part".to_string(),
                    );
                }
                KnownContentPart::Text(ChatTextPart {
                    text: p.text.clone(),
                    extra: outbound_extras::<ChatTextPart>(&p.extras, &[], log),
                })
            }
            ContentPart::Image(p) => KnownContentPart::ImageUrl(ChatImagePart {
                image_url: ChatImageUrl {
                    url: p.url.clone(),
                    detail: p.detail.clone(),
                    extra: outbound_nested_extras::<ChatImageUrl>(&p.extras, log),
                },
                extra: outbound_extras::<ChatImagePart>(&p.extras, &[], log),
            }),
            ContentPart::Audio(p) => KnownContentPart::InputAudio(ChatAudioPart {
                input_audio: ChatInputAudio {
                    data: p.data.clone(),
                    format: p.format.clone(),
                    extra: outbound_nested_extras::<ChatInputAudio>(&p.extras, log),
                },
                extra: outbound_extras::<ChatAudioPart>(&p.extras, &[], log),
            }),
            ContentPart::File(p) => KnownContentPart::File(ChatFilePart {
                file: ChatFileRef {
                    file_id: p.file_id.clone(),
                    file_data: p.file_data.clone(),
                    filename: p.filename.clone(),
                    extra: outbound_nested_extras::<ChatFileRef>(&p.extras, log),
                },
                extra: outbound_extras::<ChatFilePart>(&p.extras, &[], log),
            }),
            ContentPart::Refusal(p) => KnownContentPart::Refusal(ChatRefusalPart {
                refusal: p.refusal.clone(),
                extra: outbound_extras::<ChatRefusalPart>(&p.extras, &[], log),
            }),
            ContentPart::Unknown(p) => {
                return match p.extras.get(VENDOR, ORIGINAL_PART_KEY) {
                    Some(original) => Some(ChatContentPart::Raw(original.clone())),
                    None => {
                        log.warn(
                            COMPONENT,
                            format!(
                                "dropping content part of type '{}' with no Chat Completions form",
                                p.part_type
                            ),
                        );
                        None
                    }
                };
            }
        };
        Some(ChatContentPart::Known(known))
    }

    // -- tools ---------------------------------------------------------------

    fn tool_from_wire(&self, tool: &ChatTool) -> Tool {
        match tool {
            ChatTool::Known(KnownChatTool::Function(t)) => Tool::Function(FunctionTool {
                name: t.function.name.clone(),
                description: t.function.description.clone(),
                parameters: t.function.parameters.clone(),
                strict: t.function.strict,
                extras: inbound_nested_extras(&t.extra, &t.function.extra),
            }),
            ChatTool::Known(KnownChatTool::Custom(t)) => Tool::Custom(CustomTool {
                name: t.custom.name.clone(),
                description: t.custom.description.clone(),
                format: t.custom.format.clone(),
                extras: inbound_nested_extras(&t.extra, &t.custom.extra),
            }),
            ChatTool::Raw(raw) => {
                let tool_type = raw
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                self.log.debug(
                    COMPONENT,
                    format!("keeping tool of type '{tool_type}' as a hosted tool"),
                );
                Tool::Hosted(HostedTool {
                    tool_type,
                    extras: VendorExtras::single(VENDOR, ORIGINAL_TOOL_KEY, raw.clone()),
                })
            }
        }
    }

    fn tool_to_wire(&self, tool: &Tool) -> Result<ChatTool> {
        let log = self.log.as_ref();
        let known = match tool {
            Tool::Function(t) => KnownChatTool::Function(ChatFunctionTool {
                function: ChatFunctionDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                    strict: t.strict,
                    extra: outbound_nested_extras::<ChatFunctionDef>(&t.extras, log),
                },
                extra: outbound_extras::<ChatFunctionTool>(&t.extras, &[], log),
            }),
            Tool::Custom(t) => KnownChatTool::Custom(ChatCustomTool {
                custom: ChatCustomDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    format: t.format.clone(),
                    extra: outbound_nested_extras::<ChatCustomDef>(&t.extras, log),
                },
                extra: outbound_extras::<ChatCustomTool>(&t.extras, &[], log),
            }),
            Tool::Hosted(t) => {
                return Err(TranslateError::invalid_argument(format!(
                    "tool type '{}' is not supported by Chat Completions (only function and custom)",
                    t.tool_type
                )));
            }
        };
        Ok(ChatTool::Known(known))
    }

    fn tool_choice_from_wire(&self, choice: &ChatToolChoice) -> Result<ToolChoice> {
        let choice = match choice {
            ChatToolChoice::Mode(mode) => match ToolChoiceMode::parse(mode) {
                Some(mode) => ToolChoice::Mode(mode),
                None => hosted_choice(HostedToolKind::from_type(mode), Value::String(mode.clone())),
            },
            ChatToolChoice::Named(ChatNamedToolChoice::Function(c)) => ToolChoice::Function {
                name: c.function.name.clone(),
                extras: inbound_nested_extras(&c.extra, &c.function.extra),
            },
            ChatToolChoice::Named(ChatNamedToolChoice::Custom(c)) => ToolChoice::Custom {
                name: c.custom.name.clone(),
                extras: inbound_nested_extras(&c.extra, &c.custom.extra),
            },
            ChatToolChoice::Named(named @ ChatNamedToolChoice::AllowedTools(c)) => {
                match ToolChoiceMode::parse(&c.allowed_tools.mode) {
                    Some(mode) => allowed_tools_from_wire(mode, c),
                    None => {
                        let raw = serde_json::to_value(named).map_err(|e| {
                            TranslateError::internal("encode allowed_tools choice", e)
                        })?;
                        hosted_choice(HostedToolKind::Other("allowed_tools".to_string()), raw)
                    }
                }
            }
            ChatToolChoice::Raw(raw) => {
                let kind = raw.get("type").and_then(Value::as_str).map_or_else(
                    || HostedToolKind::Other("unknown".to_string()),
                    HostedToolKind::from_type,
                );
                self.log.debug(COMPONENT, format!("keeping tool choice {kind:?} verbatim"));
                hosted_choice(kind, raw.clone())
            }
        };
        Ok(choice)
    }

    fn tool_choice_to_wire(&self, choice: &ToolChoice) -> Result<ChatToolChoice> {
        let log = self.log.as_ref();
        let wire = match choice {
            ToolChoice::Mode(mode) => ChatToolChoice::Mode(mode.as_str().to_string()),
            ToolChoice::Function { name, extras } => {
                ChatToolChoice::Named(ChatNamedToolChoice::Function(ChatFunctionChoice {
                    function: ChatToolName {
                        name: name.clone(),
                        extra: outbound_nested_extras::<ChatToolName>(extras, log),
                    },
                    extra: outbound_extras::<ChatFunctionChoice>(extras, &[], log),
                }))
            }
            ToolChoice::Custom { name, extras } => {
                ChatToolChoice::Named(ChatNamedToolChoice::Custom(ChatCustomChoice {
                    custom: ChatToolName {
                        name: name.clone(),
                        extra: outbound_nested_extras::<ChatToolName>(extras, log),
                    },
                    extra: outbound_extras::<ChatCustomChoice>(extras, &[], log),
                }))
            }
            ToolChoice::AllowedTools {
                mode,
                tools,
                extras,
            } => {
                let tools = match extras.get(VENDOR, ORIGINAL_TOOLS_KEY) {
                    Some(Value::Array(original)) => original.clone(),
                    _ => tools
                        .iter()
                        .map(|name| json!({"type": "function", "function": {"name": name}}))
                        .collect(),
                };
                ChatToolChoice::Named(ChatNamedToolChoice::AllowedTools(ChatAllowedToolsChoice {
                    allowed_tools: ChatAllowedTools {
                        mode: mode.as_str().to_string(),
                        tools,
                        extra: outbound_nested_extras::<ChatAllowedTools>(extras, log),
                    },
                    extra: outbound_extras::<ChatAllowedToolsChoice>(
                        extras,
                        &[ORIGINAL_TOOLS_KEY],
                        log,
                    ),
                }))
            }
            ToolChoice::Hosted { kind, extras } => {
                match extras.get(VENDOR, ORIGINAL_TOOL_CHOICE_KEY) {
                    Some(Value::String(mode)) => ChatToolChoice::Mode(mode.clone()),
                    Some(raw) => ChatToolChoice::Raw(raw.clone()),
                    None => {
                        return Err(TranslateError::invalid_argument(format!(
                            "tool choice {kind:?} has no Chat Completions form"
                        )));
                    }
                }
            }
        };
        Ok(wire)
    }
}

fn is_leading_system(msg: &ChatMessage) -> bool {
    msg.role == "system" && msg.tool_calls.is_none() && msg.tool_call_id.is_none()
}

fn hosted_choice(kind: HostedToolKind, raw: Value) -> ToolChoice {
    ToolChoice::Hosted {
        kind,
        extras: VendorExtras::single(VENDOR, ORIGINAL_TOOL_CHOICE_KEY, raw),
    }
}

/// Names of the allowed tools. When an entry is not a plain named function the
/// full list is also kept verbatim.
fn allowed_tools_from_wire(mode: ToolChoiceMode, choice: &ChatAllowedToolsChoice) -> ToolChoice {
    let allowed = &choice.allowed_tools;
    let names: Vec<String> = allowed
        .tools
        .iter()
        .filter_map(|tool| {
            let kind = tool.get("type").and_then(Value::as_str)?;
            tool.get(kind)?.get("name")?.as_str().map(str::to_string)
        })
        .collect();

    let plain = names.len() == allowed.tools.len()
        && allowed
            .tools
            .iter()
            .all(|tool| tool.get("type").and_then(Value::as_str) == Some("function"));

    let mut extras = inbound_nested_extras(&choice.extra, &allowed.extra);
    if !plain {
        extras.insert(VENDOR, ORIGINAL_TOOLS_KEY, Value::Array(allowed.tools.clone()));
    }

    ToolChoice::AllowedTools {
        mode,
        tools: names,
        extras,
    }
}

/// A tool call of an unrecognised type keeps its id, takes its type as the
/// name and travels verbatim under [`ORIGINAL_TOOL_CALL_KEY`].
pub(crate) fn tool_call_from_wire(call: &ChatToolCall) -> ToolCall {
    match call {
        ChatToolCall::Known(KnownChatToolCall::Function(c)) => ToolCall {
            id: c.id.clone(),
            kind: ToolCallKind::Function,
            name: c.function.name.clone(),
            arguments: c.function.arguments.clone(),
            extras: inbound_nested_extras(&c.extra, &c.function.extra),
        },
        ChatToolCall::Known(KnownChatToolCall::Custom(c)) => ToolCall {
            id: c.id.clone(),
            kind: ToolCallKind::Custom,
            name: c.custom.name.clone(),
            arguments: c.custom.input.clone(),
            extras: inbound_nested_extras(&c.extra, &c.custom.extra),
        },
        ChatToolCall::Raw(raw) => {
            let field = |key: &str| {
                raw.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            ToolCall {
                id: field("id"),
                kind: ToolCallKind::Custom,
                name: field("type"),
                arguments: String::new(),
                extras: VendorExtras::single(VENDOR, ORIGINAL_TOOL_CALL_KEY, raw.clone()),
            }
        }
    }
}

pub(crate) fn tool_call_to_wire(call: &ToolCall, log: &dyn LogSink) -> ChatToolCall {
    if let Some(original) = call.extras.get(VENDOR, ORIGINAL_TOOL_CALL_KEY) {
        return ChatToolCall::Raw(original.clone());
    }
    let known = match call.kind {
        ToolCallKind::Function => KnownChatToolCall::Function(ChatFunctionToolCall {
            id: call.id.clone(),
            function: ChatFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                extra: outbound_nested_extras::<ChatFunctionCall>(&call.extras, log),
            },
            extra: outbound_extras::<ChatFunctionToolCall>(&call.extras, &[], log),
        }),
        ToolCallKind::Custom => KnownChatToolCall::Custom(ChatCustomToolCall {
            id: call.id.clone(),
            custom: ChatCustomCall {
                name: call.name.clone(),
                input: call.arguments.clone(),
                extra: outbound_nested_extras::<ChatCustomCall>(&call.extras, log),
            },
            extra: outbound_extras::<ChatCustomToolCall>(&call.extras, &[], log),
        }),
    };
    ChatToolCall::Known(known)
}

fn response_format_from_wire(format: &ChatResponseFormat) -> Result<ResponseFormat> {
    let format = match format {
        ChatResponseFormat::Known(KnownResponseFormat::Text) => ResponseFormat::Text,
        ChatResponseFormat::Known(KnownResponseFormat::JsonObject) => ResponseFormat::JsonObject,
        ChatResponseFormat::Known(KnownResponseFormat::JsonSchema { json_schema })
            if json_schema.extra.is_empty() =>
        {
            ResponseFormat::JsonSchema {
                name: json_schema.name.clone(),
                description: json_schema.description.clone(),
                schema: json_schema.schema.clone(),
                strict: json_schema.strict,
            }
        }
        other => {
            let raw = serde_json::to_value(other)
                .map_err(|e| TranslateError::internal("encode response_format", e))?;
            ResponseFormat::Other(VendorExtras::single(VENDOR, ORIGINAL_RESPONSE_FORMAT_KEY, raw))
        }
    };
    Ok(format)
}

fn response_format_to_wire(format: &ResponseFormat) -> Result<ChatResponseFormat> {
    let known = match format {
        ResponseFormat::Text => KnownResponseFormat::Text,
        ResponseFormat::JsonObject => KnownResponseFormat::JsonObject,
        ResponseFormat::JsonSchema {
            name,
            description,
            schema,
            strict,
        } => KnownResponseFormat::JsonSchema {
            json_schema: ChatJsonSchema {
                name: name.clone(),
                description: description.clone(),
                schema: schema.clone(),
                strict: *strict,
                extra: Default::default(),
            },
        },
        ResponseFormat::Other(extras) => {
            return extras
                .get(VENDOR, ORIGINAL_RESPONSE_FORMAT_KEY)
                .map(|raw| ChatResponseFormat::Raw(raw.clone()))
                .ok_or_else(|| {
                    TranslateError::invalid_argument(
                        "response format has no Chat Completions form",
                    )
                });
        }
    };
    Ok(ChatResponseFormat::Known(known))
}
