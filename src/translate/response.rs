//! Translate non-streaming Chat Completions responses to and from [`ResponseContract`].

use serde_json::Value;

use super::openai_types::{
    ChatAnnotation, ChatCompletionResponse, ChatFunctionCall, ChatLogprobs, ChatTokenLogprob,
    ChatTopLogprob, ChatUrlCitation, ChatUsage, Choice, ChoiceMessage, KnownAnnotation,
};
use super::request::{tool_call_from_wire, tool_call_to_wire};
use super::{inbound_extras, outbound_extras, LEGACY_FUNCTION_CALL_KEY, VENDOR};
use crate::config::{MixedContentPolicy, ResponseConfig};
use crate::contract::extras::{strip_known, ExtraFields};
use crate::contract::{
    Annotation, ContentPart, FinishReason, ResponseChoice, ResponseContract, ResponseLogprobs,
    ResponseMessage, ResponseToolCall, ResponseUsage, Role, TextPart, TokenLogprob, ToolCall,
    ToolCallKind, TopLogprob, UrlCitation, VendorExtras,
};
use crate::error::{Result, TranslateError};
use crate::logging::{self, LogSink, SharedSink};

const COMPONENT: &str = "response";

/// Message extras key holding the unrecognised message fields as one JSON string.
pub const UNKNOWN_FIELDS_KEY: &str = "unknown_fields";

pub const OBJECT_KEY: &str = "object";
pub const SERVICE_TIER_KEY: &str = "service_tier";
pub const SYSTEM_FINGERPRINT_KEY: &str = "system_fingerprint";

/// Text part extras flag: the part exists only to carry annotations of a
/// message whose `content` was null.
pub const ANNOTATIONS_ONLY_KEY: &str = "annotations_only";

const DEFAULT_OBJECT: &str = "chat.completion";

const RESPONSE_MARKERS: &[&str] = &[OBJECT_KEY, SERVICE_TIER_KEY, SYSTEM_FINGERPRINT_KEY];

/// Response translator for the Chat Completions dialect.
#[derive(Clone)]
pub struct ResponseTranslator {
    config: ResponseConfig,
    log: SharedSink,
}

impl Default for ResponseTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ResponseConfig::default(),
            log: logging::noop(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResponseConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, log: SharedSink) -> Self {
        self.log = log;
        self
    }

    pub fn to_contract(&self, resp: &ChatCompletionResponse) -> Result<ResponseContract> {
        let mut extras = inbound_extras(&resp.extra);
        if !resp.object.is_empty() {
            extras.insert(VENDOR, OBJECT_KEY, Value::String(resp.object.clone()));
        }
        if let Some(tier) = &resp.service_tier {
            extras.insert(VENDOR, SERVICE_TIER_KEY, Value::String(tier.clone()));
        }
        if let Some(fingerprint) = &resp.system_fingerprint {
            extras.insert(
                VENDOR,
                SYSTEM_FINGERPRINT_KEY,
                Value::String(fingerprint.clone()),
            );
        }

        let choices = resp
            .choices
            .iter()
            .map(|c| self.choice_from_wire(c))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResponseContract {
            id: resp.id.clone(),
            created: resp.created,
            model: resp.model.clone(),
            choices,
            usage: resp.usage.as_ref().map(usage_from_wire),
            extras,
        })
    }

    pub fn from_contract(&self, contract: &ResponseContract) -> Result<ChatCompletionResponse> {
        let extras = &contract.extras;
        let string_extra = |key: &str| {
            extras
                .get(VENDOR, key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(ChatCompletionResponse {
            id: contract.id.clone(),
            object: string_extra(OBJECT_KEY).unwrap_or_else(|| DEFAULT_OBJECT.to_string()),
            created: contract.created,
            model: contract.model.clone(),
            choices: contract
                .choices
                .iter()
                .map(|c| self.choice_to_wire(c))
                .collect(),
            usage: contract
                .usage
                .as_ref()
                .map(|u| usage_to_wire(u, self.log.as_ref())),
            service_tier: string_extra(SERVICE_TIER_KEY),
            system_fingerprint: string_extra(SYSTEM_FINGERPRINT_KEY),
            extra: outbound_extras::<ChatCompletionResponse>(
                extras,
                RESPONSE_MARKERS,
                self.log.as_ref(),
            ),
        })
    }

    fn choice_from_wire(&self, choice: &Choice) -> Result<ResponseChoice> {
        let mut extras = inbound_extras(&choice.extra);
        let raw_reason = choice.finish_reason.as_deref();
        let finish_reason = raw_reason.map(map_finish_reason);
        if raw_reason == Some("function_call") {
            extras.insert(VENDOR, LEGACY_FUNCTION_CALL_KEY, Value::Bool(true));
        }

        Ok(ResponseChoice {
            index: choice.index,
            message: self.message_from_wire(&choice.message)?,
            finish_reason,
            native_finish_reason: raw_reason
                .filter(|_| finish_reason == Some(FinishReason::Unknown))
                .map(str::to_string),
            logprobs: choice.logprobs.as_ref().map(logprobs_from_wire),
            extras,
        })
    }

    fn choice_to_wire(&self, choice: &ResponseChoice) -> Choice {
        let legacy = choice.extras.flag(VENDOR, LEGACY_FUNCTION_CALL_KEY);
        Choice {
            index: choice.index,
            message: self.message_to_wire(&choice.message),
            finish_reason: choice.finish_reason.map(|reason| {
                render_finish_reason(reason, choice.native_finish_reason.as_deref(), legacy)
            }),
            logprobs: choice
                .logprobs
                .as_ref()
                .map(|l| logprobs_to_wire(l, self.log.as_ref())),
            extra: outbound_extras::<Choice>(
                &choice.extras,
                &[LEGACY_FUNCTION_CALL_KEY],
                self.log.as_ref(),
            ),
        }
    }

    fn message_from_wire(&self, msg: &ChoiceMessage) -> Result<ResponseMessage> {
        let parts = match &msg.annotations {
            Some(annotations) if !annotations.is_empty() => vec![ContentPart::Text(TextPart {
                text: msg.content.clone().unwrap_or_default(),
                annotations: annotations.iter().map(annotation_from_wire).collect(),
                extras: if msg.content.is_none() {
                    VendorExtras::single(VENDOR, ANNOTATIONS_ONLY_KEY, Value::Bool(true))
                } else {
                    VendorExtras::default()
                },
            })],
            _ => Vec::new(),
        };

        let mut tool_calls: Vec<ResponseToolCall> = msg
            .tool_calls
            .iter()
            .flatten()
            .map(|tc| response_tool_call(tool_call_from_wire(tc)))
            .collect();

        if let Some(function_call) = &msg.function_call {
            let mut extras = inbound_extras(&function_call.extra);
            extras.insert(VENDOR, LEGACY_FUNCTION_CALL_KEY, Value::Bool(true));
            tool_calls.push(ResponseToolCall {
                id: String::new(),
                kind: ToolCallKind::Function,
                name: function_call.name.clone(),
                arguments: function_call.arguments.clone(),
                extras,
            });
        }

        let extras = if msg.extra.is_empty() {
            VendorExtras::default()
        } else {
            let encoded = serde_json::to_string(&msg.extra)
                .map_err(|e| TranslateError::internal("encode unknown message fields", e))?;
            VendorExtras::single(VENDOR, UNKNOWN_FIELDS_KEY, Value::String(encoded))
        };

        Ok(ResponseMessage {
            role: Role::from(msg.role.as_str()),
            content: msg.content.clone(),
            parts,
            refusal: msg.refusal.clone(),
            tool_calls,
            extras,
        })
    }

    fn message_to_wire(&self, msg: &ResponseMessage) -> ChoiceMessage {
        let log = self.log.as_ref();

        let annotations: Vec<ChatAnnotation> = msg
            .parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(&text.annotations),
                _ => None,
            })
            .flatten()
            .map(|a| annotation_to_wire(a, log))
            .collect();

        let mut tool_calls = Vec::with_capacity(msg.tool_calls.len());
        let mut function_call = None;
        for call in &msg.tool_calls {
            if call.extras.flag(VENDOR, LEGACY_FUNCTION_CALL_KEY) && function_call.is_none() {
                function_call = Some(ChatFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    extra: outbound_extras::<ChatFunctionCall>(
                        &call.extras,
                        &[LEGACY_FUNCTION_CALL_KEY],
                        log,
                    ),
                });
            } else {
                tool_calls.push(tool_call_to_wire(&contract_tool_call(call), log));
            }
        }

        ChoiceMessage {
            role: msg.role.to_string(),
            content: msg
                .content
                .clone()
                .or_else(|| self.flatten_parts(&msg.parts)),
            refusal: msg.refusal.clone(),
            annotations: (!annotations.is_empty()).then_some(annotations),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            function_call,
            extra: self.decode_unknown_fields(&msg.extras),
        }
    }

    /// Flat content for a message that only has parts. Parts that only carry
    /// annotations for a null `content` are skipped.
    fn flatten_parts(&self, parts: &[ContentPart]) -> Option<String> {
        let parts: Vec<&ContentPart> = parts
            .iter()
            .filter(|p| !annotations_only(p))
            .collect();
        if parts.is_empty() {
            return None;
        }

        let separator = self.config.part_separator.as_str();
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.as_text()).collect();
        if texts.len() == parts.len() {
            return Some(texts.join(separator));
        }

        let dropped: Vec<&str> = parts
            .iter()
            .filter(|p| p.as_text().is_none())
            .map(|p| p.part_type())
            .collect();

        match self.config.mixed_content {
            MixedContentPolicy::TextOnly => {
                self.log.warn(
                    COMPONENT,
                    format!("dropping non-text parts from message content: {dropped:?}"),
                );
                (!texts.is_empty()).then(|| texts.join(separator))
            }
            MixedContentPolicy::Omit => {
                self.log.warn(
                    COMPONENT,
                    format!("omitting content of a message with mixed parts: {dropped:?}"),
                );
                None
            }
        }
    }

    fn decode_unknown_fields(&self, extras: &VendorExtras) -> ExtraFields {
        let Some(raw) = extras.get(VENDOR, UNKNOWN_FIELDS_KEY) else {
            return ExtraFields::new();
        };
        let decoded = raw
            .as_str()
            .ok_or_else(|| "not a string".to_string())
            .and_then(|s| serde_json::from_str::<ExtraFields>(s).map_err(|e| e.to_string()));

        match decoded {
            Ok(fields) => strip_known::<ChoiceMessage>(&fields, self.log.as_ref()),
            Err(err) => {
                self.log.warn(
                    COMPONENT,
                    format!("ignoring malformed {UNKNOWN_FIELDS_KEY} entry: {err}"),
                );
                ExtraFields::new()
            }
        }
    }
}

/// Map a Chat Completions `finish_reason` to the canonical reason.
#[must_use]
pub fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

/// Inverse of [`map_finish_reason`]. `function_call` is only produced when the
/// legacy marker was set.
#[must_use]
pub fn render_finish_reason(
    reason: FinishReason,
    native: Option<&str>,
    legacy_function_call: bool,
) -> String {
    match reason {
        FinishReason::Unknown => native.unwrap_or(FinishReason::Unknown.as_str()).to_string(),
        FinishReason::ToolCalls if legacy_function_call => "function_call".to_string(),
        other => other.as_str().to_string(),
    }
}

pub(crate) fn usage_from_wire(usage: &ChatUsage) -> ResponseUsage {
    ResponseUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        extras: inbound_extras(&usage.extra),
    }
}

pub(crate) fn usage_to_wire(usage: &ResponseUsage, log: &dyn LogSink) -> ChatUsage {
    ChatUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        extra: outbound_extras::<ChatUsage>(&usage.extras, &[], log),
    }
}

fn annotations_only(part: &ContentPart) -> bool {
    matches!(part, ContentPart::Text(t) if t.extras.flag(VENDOR, ANNOTATIONS_ONLY_KEY))
}

fn response_tool_call(call: ToolCall) -> ResponseToolCall {
    ResponseToolCall {
        id: call.id,
        kind: call.kind,
        name: call.name,
        arguments: call.arguments,
        extras: call.extras,
    }
}

fn contract_tool_call(call: &ResponseToolCall) -> ToolCall {
    ToolCall {
        id: call.id.clone(),
        kind: call.kind,
        name: call.name.clone(),
        arguments: call.arguments.clone(),
        extras: call.extras.clone(),
    }
}

fn annotation_from_wire(annotation: &ChatAnnotation) -> Annotation {
    match annotation {
        ChatAnnotation::Known(KnownAnnotation::UrlCitation { url_citation }) => {
            Annotation::UrlCitation(UrlCitation {
                start_index: url_citation.start_index,
                end_index: url_citation.end_index,
                url: url_citation.url.clone(),
                title: url_citation.title.clone(),
                extras: inbound_extras(&url_citation.extra),
            })
        }
        ChatAnnotation::Raw(raw) => Annotation::Other(raw.clone()),
    }
}

fn annotation_to_wire(annotation: &Annotation, log: &dyn LogSink) -> ChatAnnotation {
    match annotation {
        Annotation::UrlCitation(citation) => ChatAnnotation::Known(KnownAnnotation::UrlCitation {
            url_citation: ChatUrlCitation {
                start_index: citation.start_index,
                end_index: citation.end_index,
                url: citation.url.clone(),
                title: citation.title.clone(),
                extra: outbound_extras::<ChatUrlCitation>(&citation.extras, &[], log),
            },
        }),
        Annotation::Other(raw) => ChatAnnotation::Raw(raw.clone()),
    }
}

fn token_logprob_from_wire(t: &ChatTokenLogprob) -> TokenLogprob {
    TokenLogprob {
        token: t.token.clone(),
        logprob: t.logprob,
        bytes: t.bytes.clone(),
        top_logprobs: t
            .top_logprobs
            .iter()
            .map(|top| TopLogprob {
                token: top.token.clone(),
                logprob: top.logprob,
                bytes: top.bytes.clone(),
                extras: inbound_extras(&top.extra),
            })
            .collect(),
        extras: inbound_extras(&t.extra),
    }
}

fn token_logprob_to_wire(t: &TokenLogprob, log: &dyn LogSink) -> ChatTokenLogprob {
    ChatTokenLogprob {
        token: t.token.clone(),
        logprob: t.logprob,
        bytes: t.bytes.clone(),
        top_logprobs: t
            .top_logprobs
            .iter()
            .map(|top| ChatTopLogprob {
                token: top.token.clone(),
                logprob: top.logprob,
                bytes: top.bytes.clone(),
                extra: outbound_extras::<ChatTopLogprob>(&top.extras, &[], log),
            })
            .collect(),
        extra: outbound_extras::<ChatTokenLogprob>(&t.extras, &[], log),
    }
}

fn logprobs_from_wire(logprobs: &ChatLogprobs) -> ResponseLogprobs {
    let tokens = |list: &Option<Vec<ChatTokenLogprob>>| {
        list.as_ref()
            .map(|list| list.iter().map(token_logprob_from_wire).collect())
    };
    ResponseLogprobs {
        content: tokens(&logprobs.content),
        refusal: tokens(&logprobs.refusal),
        extras: inbound_extras(&logprobs.extra),
    }
}

fn logprobs_to_wire(logprobs: &ResponseLogprobs, log: &dyn LogSink) -> ChatLogprobs {
    let tokens = |list: &Option<Vec<TokenLogprob>>| {
        list.as_ref()
            .map(|list| list.iter().map(|t| token_logprob_to_wire(t, log)).collect())
    };
    ChatLogprobs {
        content: tokens(&logprobs.content),
        refusal: tokens(&logprobs.refusal),
        extra: outbound_extras::<ChatLogprobs>(&logprobs.extras, &[], log),
    }
}
