//! Translate Chat Completions streaming chunks to and from [`StreamEventContract`]s.
//!
//! One chunk fans out into zero or more contract events (start, delta, stop per
//! choice); one contract event renders as exactly one chunk. Response- and
//! choice-level fields without a contract slot travel in the `openai_chat`
//! extensions namespace of every event.

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;

use super::openai_types::{
    ChatCompletionChunk, ChatError, ChatErrorResponse, ChunkChoice, ChunkCustom, ChunkDelta,
    ChunkFunction, ChunkToolCall,
};
use super::response::{map_finish_reason, usage_from_wire, usage_to_wire};
use super::{
    inbound_extras, inbound_nested_extras, outbound_extras, outbound_nested_extras,
    LEGACY_FUNCTION_CALL_KEY, VENDOR,
};
use crate::contract::extras::{strip_known, ExtraFields};
use crate::contract::{
    Extensions, MessageDelta, MessageStart, MessageStop, Role, StreamError, StreamEventContract,
    StreamEventPayload, ToolCallDelta, ToolCallKind,
};
use crate::error::{Result, TranslateError};
use crate::logging::{self, SharedSink};

const COMPONENT: &str = "stream";

const DEFAULT_OBJECT: &str = "chat.completion.chunk";

/// Extension keys written under the `openai_chat` namespace.
pub mod ext {
    pub const OBJECT: &str = "object";
    pub const SERVICE_TIER: &str = "service_tier";
    pub const SYSTEM_FINGERPRINT: &str = "system_fingerprint";
    pub const CHUNK_EXTRAS: &str = "chunk_extras";
    /// Raw vendor finish reason.
    pub const FINISH_REASON: &str = "finish_reason";
    pub const LOGPROBS: &str = "logprobs";
    pub const CHOICE_EXTRAS: &str = "choice_extras";
    pub const DELTA_EXTRAS: &str = "delta_extras";
    /// Unrecognised fields of an inline error object.
    pub const ERROR_EXTRAS: &str = "error_extras";
    /// Error `code` as sent, when it was not a string.
    pub const ERROR_CODE: &str = "error_code";
}

/// Tool-call delta extras key carrying the vendor array index.
pub const TOOL_CALL_INDEX_KEY: &str = "index";

/// One decoded SSE `data:` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamFrame {
    Chunk(ChatCompletionChunk),
    /// Inline `{"error": {...}}` payload.
    Error(ChatError),
    /// The `[DONE]` sentinel.
    Done,
}

/// Parse the payload of one SSE `data:` line.
pub fn decode_payload(data: &str) -> Result<ChatStreamFrame> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(ChatStreamFrame::Done);
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| TranslateError::stream(format!("invalid chunk payload: {e}")))?;

    if value.get("error").is_some() {
        let err: ChatErrorResponse = serde_json::from_value(value)
            .map_err(|e| TranslateError::stream(format!("invalid error payload: {e}")))?;
        return Ok(ChatStreamFrame::Error(err.error));
    }

    serde_json::from_value(value)
        .map(ChatStreamFrame::Chunk)
        .map_err(|e| TranslateError::stream(format!("invalid chunk payload: {e}")))
}

/// Render a frame as the payload of an SSE `data:` line.
pub fn encode_payload(frame: &ChatStreamFrame) -> Result<String> {
    let encoded = match frame {
        ChatStreamFrame::Chunk(chunk) => serde_json::to_string(chunk)?,
        ChatStreamFrame::Error(error) => serde_json::to_string(&ChatErrorResponse {
            error: error.clone(),
        })?,
        ChatStreamFrame::Done => "[DONE]".to_string(),
    };
    Ok(encoded)
}

/// Payload of one input line: the body of an SSE `data:` line, or a bare JSON
/// object line. Other SSE fields, comments and blank lines yield `None`.
#[must_use]
pub fn sse_data(line: &str) -> Option<&str> {
    let line = line.trim();
    if let Some(data) = line.strip_prefix("data:") {
        return Some(data.trim_start());
    }
    line.starts_with('{').then_some(line)
}

/// Stateless translator between chunks and contract events.
#[derive(Clone)]
pub struct StreamTranslator {
    log: SharedSink,
}

impl Default for StreamTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: logging::noop(),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, log: SharedSink) -> Self {
        self.log = log;
        self
    }

    /// Fan one chunk out into contract events.
    pub fn to_contract(&self, chunk: &ChatCompletionChunk) -> Result<Vec<StreamEventContract>> {
        let base = chunk_extensions(chunk);
        let mut events = Vec::with_capacity(chunk.choices.len() * 2 + 1);

        for choice in &chunk.choices {
            let mut extensions = base.clone();
            merge_choice_extensions(&mut extensions, choice);
            let event = |payload| StreamEventContract {
                response_id: Some(chunk.id.clone()),
                message_id: None,
                output_index: choice.index,
                created: Some(chunk.created),
                model: (!chunk.model.is_empty()).then(|| chunk.model.clone()),
                payload,
                extensions: extensions.clone(),
            };

            let delta = &choice.delta;
            let role = non_empty(delta.role.as_deref()).map(Role::from);
            let content = non_empty(delta.content.as_deref()).map(str::to_string);
            let refusal = non_empty(delta.refusal.as_deref()).map(str::to_string);
            let tool_calls = tool_call_deltas_from_wire(delta);

            if content.is_some() || refusal.is_some() || !tool_calls.is_empty() {
                events.push(event(StreamEventPayload::MessageDelta(MessageDelta {
                    role,
                    content,
                    refusal,
                    tool_calls,
                })));
            } else if let Some(role) = role {
                events.push(event(StreamEventPayload::MessageStart(MessageStart { role })));
            }

            if let Some(reason) = choice.finish_reason.as_deref() {
                events.push(event(StreamEventPayload::MessageStop(MessageStop {
                    finish_reason: Some(map_finish_reason(reason)),
                    usage: None,
                })));
            }
        }

        if let Some(usage) = &chunk.usage {
            let usage = usage_from_wire(usage);
            let last_stop = events.iter_mut().rev().find_map(|e| match &mut e.payload {
                StreamEventPayload::MessageStop(stop) => Some(stop),
                _ => None,
            });
            match last_stop {
                Some(stop) => stop.usage = Some(usage),
                None => events.push(StreamEventContract {
                    response_id: Some(chunk.id.clone()),
                    message_id: None,
                    output_index: 0,
                    created: Some(chunk.created),
                    model: (!chunk.model.is_empty()).then(|| chunk.model.clone()),
                    payload: StreamEventPayload::MessageStop(MessageStop {
                        finish_reason: None,
                        usage: Some(usage),
                    }),
                    extensions: base,
                }),
            }
        }

        Ok(events)
    }

    /// Render one contract event as exactly one chunk. An error event yields
    /// [`TranslateError::RequestFailed`] instead.
    pub fn from_contract(&self, event: &StreamEventContract) -> Result<ChatCompletionChunk> {
        let log = self.log.as_ref();
        let ns = event.extensions.namespace(VENDOR.namespace());
        let ext_str = |key: &str| {
            event
                .extensions
                .get_str(VENDOR.namespace(), key)
                .map(str::to_string)
        };
        let ext_object = |key: &str| -> ExtraFields {
            match ns.and_then(|fields| fields.get(key)) {
                Some(Value::Object(fields)) => fields.clone(),
                _ => ExtraFields::new(),
            }
        };

        let mut chunk = ChatCompletionChunk {
            id: event.response_id.clone().unwrap_or_default(),
            object: ext_str(ext::OBJECT).unwrap_or_else(|| DEFAULT_OBJECT.to_string()),
            created: event.created.unwrap_or_default(),
            model: event.model.clone().unwrap_or_default(),
            choices: Vec::new(),
            usage: None,
            service_tier: ext_str(ext::SERVICE_TIER),
            system_fingerprint: ext_str(ext::SYSTEM_FINGERPRINT),
            extra: strip_known::<ChatCompletionChunk>(&ext_object(ext::CHUNK_EXTRAS), log),
        };
        let choice = |delta: ChunkDelta, finish_reason: Option<String>, logprobs| ChunkChoice {
            index: event.output_index,
            delta,
            finish_reason,
            logprobs,
            extra: strip_known::<ChunkChoice>(&ext_object(ext::CHOICE_EXTRAS), log),
        };
        let delta_extra = || strip_known::<ChunkDelta>(&ext_object(ext::DELTA_EXTRAS), log);
        let logprobs = ns.and_then(|fields| fields.get(ext::LOGPROBS)).cloned();

        match &event.payload {
            StreamEventPayload::MessageStart(start) => {
                let delta = ChunkDelta {
                    role: Some(start.role.to_string()),
                    extra: delta_extra(),
                    ..ChunkDelta::default()
                };
                chunk.choices.push(choice(delta, None, logprobs));
            }
            StreamEventPayload::MessageDelta(delta) => {
                let (tool_calls, function_call) = self.tool_call_deltas_to_wire(&delta.tool_calls);
                let delta = ChunkDelta {
                    role: delta.role.as_ref().map(Role::to_string),
                    content: delta.content.clone(),
                    refusal: delta.refusal.clone(),
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                    function_call,
                    extra: delta_extra(),
                };
                chunk.choices.push(choice(delta, None, logprobs));
            }
            StreamEventPayload::MessageStop(stop) => {
                if let Some(reason) = stop.finish_reason {
                    let raw = ext_str(ext::FINISH_REASON)
                        .filter(|raw| map_finish_reason(raw) == reason)
                        .unwrap_or_else(|| reason.as_str().to_string());
                    chunk
                        .choices
                        .push(choice(ChunkDelta::default(), Some(raw), None));
                }
                chunk.usage = stop.usage.as_ref().map(|u| usage_to_wire(u, log));
            }
            StreamEventPayload::Error(error) => {
                return Err(TranslateError::request_failed(
                    error.message.clone(),
                    error.error_type.clone(),
                    error.code.clone(),
                ));
            }
        }

        Ok(chunk)
    }

    /// Inline error object for an error event, `None` for any other payload.
    #[must_use]
    pub fn error_to_wire(&self, event: &StreamEventContract) -> Option<ChatError> {
        let StreamEventPayload::Error(error) = &event.payload else {
            return None;
        };
        let ns = VENDOR.namespace();
        let extra = match event.extensions.get(ns, ext::ERROR_EXTRAS) {
            Some(Value::Object(fields)) => strip_known::<ChatError>(fields, self.log.as_ref()),
            _ => ExtraFields::new(),
        };
        let mut wire = ChatError {
            message: error.message.clone(),
            error_type: error.error_type.clone(),
            code: event.extensions.get(ns, ext::ERROR_CODE).cloned(),
            param: error.param.clone(),
            extra,
        };
        if wire.code.is_none() || wire.code_string() != error.code {
            wire.code = error.code.clone().map(Value::String);
        }
        Some(wire)
    }

    /// Events for one decoded frame. `[DONE]` yields nothing.
    pub fn frame_to_contract(&self, frame: &ChatStreamFrame) -> Result<Vec<StreamEventContract>> {
        match frame {
            ChatStreamFrame::Chunk(chunk) => self.to_contract(chunk),
            ChatStreamFrame::Error(error) => Ok(vec![error_event(error)]),
            ChatStreamFrame::Done => Ok(Vec::new()),
        }
    }

    /// Adapt a stream of decoded frames into a stream of contract events.
    ///
    /// The output ends at `[DONE]`, after an error event, or after the first
    /// failed translation.
    pub fn events<S>(&self, frames: S) -> impl Stream<Item = Result<StreamEventContract>>
    where
        S: Stream<Item = Result<ChatStreamFrame>>,
    {
        let translator = self.clone();
        frames
            .scan(false, move |finished, frame| {
                if *finished {
                    return future::ready(None);
                }
                let batch: Vec<Result<StreamEventContract>> = match frame {
                    Ok(ChatStreamFrame::Done) => return future::ready(None),
                    Ok(ChatStreamFrame::Error(error)) => {
                        *finished = true;
                        vec![Ok(error_event(&error))]
                    }
                    Ok(ChatStreamFrame::Chunk(chunk)) => match translator.to_contract(&chunk) {
                        Ok(events) => events.into_iter().map(Ok).collect(),
                        Err(err) => {
                            *finished = true;
                            vec![Err(err)]
                        }
                    },
                    Err(err) => {
                        *finished = true;
                        vec![Err(err)]
                    }
                };
                future::ready(Some(stream::iter(batch)))
            })
            .flatten()
    }

    fn tool_call_deltas_to_wire(
        &self,
        deltas: &[ToolCallDelta],
    ) -> (Vec<ChunkToolCall>, Option<ChunkFunction>) {
        let log = self.log.as_ref();
        let mut tool_calls = Vec::with_capacity(deltas.len());
        let mut function_call = None;

        for delta in deltas {
            if delta.extras.flag(VENDOR, LEGACY_FUNCTION_CALL_KEY) {
                if function_call.is_none() {
                    function_call = Some(ChunkFunction {
                        name: delta.name.clone(),
                        arguments: delta.arguments.clone(),
                        extra: outbound_extras::<ChunkFunction>(
                            &delta.extras,
                            &[LEGACY_FUNCTION_CALL_KEY],
                            log,
                        ),
                    });
                } else {
                    log.warn(
                        COMPONENT,
                        "dropping extra legacy function_call delta in one event".to_string(),
                    );
                }
                continue;
            }

            let index = delta
                .extras
                .get(VENDOR, TOOL_CALL_INDEX_KEY)
                .and_then(Value::as_u64)
                .and_then(|index| u32::try_from(index).ok())
                .unwrap_or_else(|| u32::try_from(tool_calls.len()).unwrap_or(u32::MAX));

            let (function, custom) = match delta.kind {
                Some(ToolCallKind::Custom) => (
                    None,
                    Some(ChunkCustom {
                        name: delta.name.clone(),
                        input: delta.arguments.clone(),
                        extra: outbound_nested_extras::<ChunkCustom>(&delta.extras, log),
                    }),
                ),
                _ if delta.name.is_some() || delta.arguments.is_some() => (
                    Some(ChunkFunction {
                        name: delta.name.clone(),
                        arguments: delta.arguments.clone(),
                        extra: outbound_nested_extras::<ChunkFunction>(&delta.extras, log),
                    }),
                    None,
                ),
                _ => (None, None),
            };

            tool_calls.push(ChunkToolCall {
                index,
                id: delta.id.clone(),
                call_type: delta.kind.map(|kind| kind_name(kind).to_string()),
                function,
                custom,
                extra: outbound_extras::<ChunkToolCall>(
                    &delta.extras,
                    &[TOOL_CALL_INDEX_KEY, LEGACY_FUNCTION_CALL_KEY],
                    log,
                ),
            });
        }

        (tool_calls, function_call)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

const fn kind_name(kind: ToolCallKind) -> &'static str {
    match kind {
        ToolCallKind::Function => "function",
        ToolCallKind::Custom => "custom",
    }
}

fn chunk_extensions(chunk: &ChatCompletionChunk) -> Extensions {
    let ns = VENDOR.namespace();
    let mut extensions = Extensions::new();
    if !chunk.object.is_empty() {
        extensions.insert(ns, ext::OBJECT, Value::String(chunk.object.clone()));
    }
    if let Some(tier) = &chunk.service_tier {
        extensions.insert(ns, ext::SERVICE_TIER, Value::String(tier.clone()));
    }
    if let Some(fingerprint) = &chunk.system_fingerprint {
        extensions.insert(ns, ext::SYSTEM_FINGERPRINT, Value::String(fingerprint.clone()));
    }
    if !chunk.extra.is_empty() {
        extensions.insert(ns, ext::CHUNK_EXTRAS, Value::Object(chunk.extra.clone()));
    }
    extensions
}

fn merge_choice_extensions(extensions: &mut Extensions, choice: &ChunkChoice) {
    let ns = VENDOR.namespace();
    if let Some(reason) = &choice.finish_reason {
        extensions.insert(ns, ext::FINISH_REASON, Value::String(reason.clone()));
    }
    if let Some(logprobs) = &choice.logprobs {
        extensions.insert(ns, ext::LOGPROBS, logprobs.clone());
    }
    if !choice.extra.is_empty() {
        extensions.insert(ns, ext::CHOICE_EXTRAS, Value::Object(choice.extra.clone()));
    }
    if !choice.delta.extra.is_empty() {
        extensions.insert(ns, ext::DELTA_EXTRAS, Value::Object(choice.delta.extra.clone()));
    }
}

fn tool_call_deltas_from_wire(delta: &ChunkDelta) -> Vec<ToolCallDelta> {
    let mut deltas: Vec<ToolCallDelta> = delta
        .tool_calls
        .iter()
        .flatten()
        .map(|tc| {
            let mut extras = match (&tc.function, &tc.custom) {
                (Some(function), _) => inbound_nested_extras(&tc.extra, &function.extra),
                (None, Some(custom)) => inbound_nested_extras(&tc.extra, &custom.extra),
                (None, None) => inbound_extras(&tc.extra),
            };
            extras.insert(VENDOR, TOOL_CALL_INDEX_KEY, Value::from(tc.index));
            let kind = match tc.call_type.as_deref() {
                Some("function") => Some(ToolCallKind::Function),
                Some("custom") => Some(ToolCallKind::Custom),
                _ => None,
            };
            let (name, arguments) = match (&tc.function, &tc.custom) {
                (Some(function), _) => (function.name.clone(), function.arguments.clone()),
                (None, Some(custom)) => (custom.name.clone(), custom.input.clone()),
                (None, None) => (None, None),
            };
            ToolCallDelta {
                id: tc.id.clone(),
                kind,
                name,
                arguments,
                extras,
            }
        })
        .collect();

    if let Some(function_call) = &delta.function_call {
        let mut extras = inbound_extras(&function_call.extra);
        extras.insert(VENDOR, LEGACY_FUNCTION_CALL_KEY, Value::Bool(true));
        deltas.push(ToolCallDelta {
            id: None,
            kind: Some(ToolCallKind::Function),
            name: function_call.name.clone(),
            arguments: function_call.arguments.clone(),
            extras,
        });
    }

    deltas
}

fn error_event(error: &ChatError) -> StreamEventContract {
    let mut event = StreamEventContract::new(StreamEventPayload::Error(StreamError {
        message: error.message.clone(),
        error_type: error.error_type.clone(),
        code: error.code_string(),
        param: error.param.clone(),
    }));
    let ns = VENDOR.namespace();
    if let Some(code) = error.code.as_ref().filter(|code| !code.is_string()) {
        event.extensions.insert(ns, ext::ERROR_CODE, code.clone());
    }
    if !error.extra.is_empty() {
        event.extensions.insert(ns, ext::ERROR_EXTRAS, Value::Object(error.extra.clone()));
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FinishReason, ResponseUsage, Vendor, VendorExtras};
    use crate::error::ErrorKind;
    use crate::translate::openai_types::ChatUsage;
    use serde_json::json;

    fn chunk(value: Value) -> ChatCompletionChunk {
        serde_json::from_value(value).unwrap()
    }

    fn text_chunk(content: &str, finish: Option<&str>) -> ChatCompletionChunk {
        chunk(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": finish}]
        }))
    }

    fn usage() -> ChatUsage {
        ChatUsage {
            prompt_tokens: 5,
            completion_tokens: 7,
            total_tokens: 12,
            extra: ExtraFields::new(),
        }
    }

    #[test]
    fn test_role_only_chunk_is_message_start() {
        let events = StreamTranslator::new()
            .to_contract(&chunk(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion.chunk",
                "created": 1,
                "model": "gpt-4o",
                "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}, "finish_reason": null}]
            })))
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            StreamEventPayload::MessageStart(MessageStart {
                role: Role::Assistant
            })
        );
        assert_eq!(events[0].response_id.as_deref(), Some("chatcmpl-1"));
    }

    #[test]
    fn test_content_with_finish_splits_delta_and_stop() {
        let mut c = text_chunk("hi", Some("stop"));
        c.usage = Some(usage());

        let events = StreamTranslator::new().to_contract(&c).unwrap();

        assert_eq!(events.len(), 2);
        match &events[0].payload {
            StreamEventPayload::MessageDelta(delta) => {
                assert_eq!(delta.content.as_deref(), Some("hi"));
                assert!(delta.role.is_none());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
        match &events[1].payload {
            StreamEventPayload::MessageStop(stop) => {
                assert_eq!(stop.finish_reason, Some(FinishReason::Stop));
                assert_eq!(stop.usage.as_ref().unwrap().total_tokens, 12);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_role_with_content_embeds_role_in_delta() {
        let events = StreamTranslator::new()
            .to_contract(&chunk(json!({
                "id": "c",
                "model": "m",
                "choices": [{"index": 0, "delta": {"role": "assistant", "content": "Hello"}}]
            })))
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].payload,
            StreamEventPayload::MessageDelta(MessageDelta { role: Some(Role::Assistant), .. })
        ));
    }

    #[test]
    fn test_usage_only_chunk_yields_stop_without_reason() {
        let mut c = text_chunk("", None);
        c.choices.clear();
        c.usage = Some(usage());

        let events = StreamTranslator::new().to_contract(&c).unwrap();

        assert_eq!(events.len(), 1);
        match &events[0].payload {
            StreamEventPayload::MessageStop(stop) => {
                assert_eq!(stop.finish_reason, None);
                assert_eq!(stop.usage.as_ref().unwrap().prompt_tokens, 5);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_usage_goes_on_last_stop_of_chunk() {
        let mut c = chunk(json!({
            "id": "c",
            "model": "m",
            "choices": [
                {"index": 0, "delta": {}, "finish_reason": "stop"},
                {"index": 1, "delta": {}, "finish_reason": "length"}
            ]
        }));
        c.usage = Some(usage());

        let events = StreamTranslator::new().to_contract(&c).unwrap();

        assert_eq!(events.len(), 2);
        let usages: Vec<bool> = events
            .iter()
            .map(|e| matches!(&e.payload, StreamEventPayload::MessageStop(s) if s.usage.is_some()))
            .collect();
        assert_eq!(usages, vec![false, true]);
        assert_eq!(events[1].output_index, 1);
    }

    #[test]
    fn test_tool_call_deltas_keep_index() {
        let events = StreamTranslator::new()
            .to_contract(&chunk(json!({
                "id": "c",
                "model": "m",
                "choices": [{"index": 0, "delta": {"tool_calls": [
                    {"index": 2, "id": "call_1", "type": "function", "function": {"name": "search", "arguments": "{\"q\""}}
                ]}}]
            })))
            .unwrap();

        let StreamEventPayload::MessageDelta(delta) = &events[0].payload else {
            panic!("expected delta");
        };
        let call = &delta.tool_calls[0];
        assert_eq!(call.kind, Some(ToolCallKind::Function));
        assert_eq!(call.name.as_deref(), Some("search"));
        assert_eq!(call.extras.get(Vendor::OpenAiChat, TOOL_CALL_INDEX_KEY), Some(&json!(2)));

        let back = StreamTranslator::new().from_contract(&events[0]).unwrap();
        let tc = &back.choices[0].delta.tool_calls.as_ref().unwrap()[0];
        assert_eq!(tc.index, 2);
        assert!(tc.extra.is_empty());
    }

    #[test]
    fn test_tool_call_index_falls_back_to_position() {
        let mut event = StreamEventContract::new(StreamEventPayload::MessageDelta(MessageDelta {
            tool_calls: vec![
                ToolCallDelta {
                    arguments: Some("{".to_string()),
                    ..ToolCallDelta::default()
                },
                ToolCallDelta {
                    arguments: Some("}".to_string()),
                    ..ToolCallDelta::default()
                },
            ],
            ..MessageDelta::default()
        }));
        event.response_id = Some("c".to_string());

        let chunk = StreamTranslator::new().from_contract(&event).unwrap();
        let indices: Vec<u32> = chunk.choices[0]
            .delta
            .tool_calls
            .as_ref()
            .unwrap()
            .iter()
            .map(|tc| tc.index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_legacy_function_call_delta() {
        let events = StreamTranslator::new()
            .to_contract(&chunk(json!({
                "id": "c",
                "model": "m",
                "choices": [{"index": 0, "delta": {"function_call": {"arguments": "{}"}}}]
            })))
            .unwrap();

        let StreamEventPayload::MessageDelta(delta) = &events[0].payload else {
            panic!("expected delta");
        };
        assert!(delta.tool_calls[0]
            .extras
            .flag(Vendor::OpenAiChat, LEGACY_FUNCTION_CALL_KEY));

        let back = StreamTranslator::new().from_contract(&events[0]).unwrap();
        let wire_delta = &back.choices[0].delta;
        assert!(wire_delta.tool_calls.is_none());
        assert_eq!(
            wire_delta.function_call.as_ref().unwrap().arguments.as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_stop_event_renders_empty_delta() {
        let mut event = StreamEventContract::new(StreamEventPayload::MessageStop(MessageStop {
            finish_reason: Some(FinishReason::Length),
            usage: Some(ResponseUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
                extras: VendorExtras::default(),
            }),
        }));
        event.response_id = Some("chatcmpl-9".to_string());

        let chunk = StreamTranslator::new().from_contract(&event).unwrap();

        assert_eq!(chunk.id, "chatcmpl-9");
        assert_eq!(chunk.object, "chat.completion.chunk");
        assert_eq!(chunk.choices.len(), 1);
        assert_eq!(chunk.choices[0].delta, ChunkDelta::default());
        assert_eq!(chunk.choices[0].finish_reason.as_deref(), Some("length"));
        assert_eq!(chunk.usage.as_ref().unwrap().total_tokens, 3);
    }

    #[test]
    fn test_stop_without_reason_has_no_choices() {
        let event = StreamEventContract::new(StreamEventPayload::MessageStop(MessageStop {
            finish_reason: None,
            usage: Some(ResponseUsage::default()),
        }));

        let chunk = StreamTranslator::new().from_contract(&event).unwrap();
        assert!(chunk.choices.is_empty());
        assert!(chunk.usage.is_some());
    }

    #[test]
    fn test_raw_finish_reason_comes_back_from_extensions() {
        let events = StreamTranslator::new()
            .to_contract(&text_chunk("", Some("eos")))
            .unwrap();

        assert_eq!(events.len(), 1);
        let back = StreamTranslator::new().from_contract(&events[0]).unwrap();
        assert_eq!(back.choices[0].finish_reason.as_deref(), Some("eos"));
    }

    #[test]
    fn test_chunk_level_fields_ride_in_extensions() {
        let c = chunk(json!({
            "id": "c",
            "object": "chat.completion.chunk",
            "created": 3,
            "model": "m",
            "system_fingerprint": "fp_1",
            "obfuscation": "xyz",
            "choices": [{"index": 0, "delta": {"content": "a", "reasoning": "r"}, "logprobs": {"content": []}}]
        }));

        let events = StreamTranslator::new().to_contract(&c).unwrap();
        let ns = events[0].extensions.namespace("openai_chat").unwrap();
        assert_eq!(ns["system_fingerprint"], json!("fp_1"));
        assert_eq!(ns["chunk_extras"], json!({"obfuscation": "xyz"}));
        assert_eq!(ns["delta_extras"], json!({"reasoning": "r"}));

        let back = StreamTranslator::new().from_contract(&events[0]).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_error_event_is_request_failed() {
        let event = StreamEventContract::new(StreamEventPayload::Error(StreamError {
            message: "rate limited".to_string(),
            error_type: Some("rate_limit_error".to_string()),
            code: Some("429".to_string()),
            param: None,
        }));

        let err = StreamTranslator::new().from_contract(&event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
    }

    #[test]
    fn test_decode_payload_frames() {
        assert_eq!(decode_payload(" [DONE] ").unwrap(), ChatStreamFrame::Done);

        match decode_payload(r#"{"error": {"message": "boom", "type": "server_error"}}"#).unwrap() {
            ChatStreamFrame::Error(err) => assert_eq!(err.message, "boom"),
            other => panic!("unexpected frame: {other:?}"),
        }

        let frame = decode_payload(r#"{"id": "c", "model": "m", "choices": []}"#).unwrap();
        assert!(matches!(frame, ChatStreamFrame::Chunk(_)));

        let err = decode_payload("{oops").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Stream);
    }

    #[test]
    fn test_sse_data_lines() {
        assert_eq!(sse_data("data: {\"id\":1}"), Some("{\"id\":1}"));
        assert_eq!(sse_data("data:[DONE]"), Some("[DONE]"));
        assert_eq!(sse_data("{\"id\":1}"), Some("{\"id\":1}"));
        assert_eq!(sse_data(": keep-alive"), None);
        assert_eq!(sse_data("event: message"), None);
        assert_eq!(sse_data(""), None);
    }

    #[test]
    fn test_events_adapter_stops_at_done() {
        let frames = vec![
            Ok(ChatStreamFrame::Chunk(text_chunk("a", None))),
            Ok(ChatStreamFrame::Chunk(text_chunk("", Some("stop")))),
            Ok(ChatStreamFrame::Done),
            Ok(ChatStreamFrame::Chunk(text_chunk("late", None))),
        ];

        let translator = StreamTranslator::new();
        let events: Vec<_> =
            futures::executor::block_on(translator.events(stream::iter(frames)).collect());

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(std::result::Result::is_ok));
    }

    #[test]
    fn test_events_adapter_ends_after_error_frame() {
        let frames = vec![
            Ok(ChatStreamFrame::Error(ChatError {
                message: "overloaded".to_string(),
                error_type: None,
                code: None,
                param: None,
                extra: ExtraFields::new(),
            })),
            Ok(ChatStreamFrame::Chunk(text_chunk("late", None))),
        ];

        let translator = StreamTranslator::new();
        let events: Vec<_> =
            futures::executor::block_on(translator.events(stream::iter(frames)).collect());

        assert_eq!(events.len(), 1);
        let event = events[0].as_ref().unwrap();
        assert!(matches!(event.payload, StreamEventPayload::Error(_)));
    }
    #[test]
    fn test_tool_call_delta_residuals_round_trip() {
        let c = chunk(json!({
            "id": "c",
            "object": "chat.completion.chunk",
            "created": 3,
            "model": "m",
            "choices": [{"index": 0, "delta": {"tool_calls": [
                {
                    "index": 0,
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "search", "arguments": "{}", "partial": true},
                    "trace": "t1"
                },
                {"index": 1, "type": "custom", "custom": {"input": "ls", "grammar": "sh"}}
            ]}}]
        }));
        let translator = StreamTranslator::new();

        let events = translator.to_contract(&c).unwrap();
        let StreamEventPayload::MessageDelta(delta) = &events[0].payload else {
            panic!("expected delta");
        };
        assert_eq!(
            delta.tool_calls[0].extras.get(Vendor::OpenAiChat, "trace"),
            Some(&json!("t1"))
        );

        let back = translator.from_contract(&events[0]).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_legacy_function_call_delta_keeps_residuals() {
        let c = chunk(json!({
            "id": "c",
            "object": "chat.completion.chunk",
            "created": 3,
            "model": "m",
            "choices": [{"index": 0, "delta": {
                "function_call": {"name": "lookup", "arguments": "{}", "thought": "x"}
            }}]
        }));
        let translator = StreamTranslator::new();

        let events = translator.to_contract(&c).unwrap();
        let back = translator.from_contract(&events[0]).unwrap();

        assert_eq!(back, c);
    }

    #[test]
    fn test_frame_to_contract_per_frame_kind() {
        let translator = StreamTranslator::new();

        let events = translator
            .frame_to_contract(&ChatStreamFrame::Chunk(text_chunk("a", Some("stop"))))
            .unwrap();
        assert_eq!(events.len(), 2);

        let frame = decode_payload(r#"{"error": {"message": "boom", "code": 503}}"#).unwrap();
        let events = translator.frame_to_contract(&frame).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            StreamEventPayload::Error(error) => {
                assert_eq!(error.message, "boom");
                assert_eq!(error.code.as_deref(), Some("503"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        assert!(translator
            .frame_to_contract(&ChatStreamFrame::Done)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_error_frame_round_trips_through_event() {
        let payload = r#"{"error": {"message": "overloaded", "code": 503, "request_id": "r1"}}"#;
        let frame = decode_payload(payload).unwrap();
        let ChatStreamFrame::Error(original) = &frame else {
            panic!("expected error frame");
        };
        let translator = StreamTranslator::new();

        let events = translator.frame_to_contract(&frame).unwrap();
        let back = translator.error_to_wire(&events[0]).unwrap();

        assert_eq!(&back, original);
        assert_eq!(back.code, Some(json!(503)));
        assert!(translator
            .error_to_wire(&StreamEventContract::new(StreamEventPayload::MessageStart(
                MessageStart {
                    role: Role::Assistant
                }
            )))
            .is_none());
    }
}
