use contract_bridge::config::{BridgeConfig, MixedContentPolicy};
use contract_bridge::contract::{
    FinishReason, HostedTool, MessageStop, RequestContract, ResponseUsage, Role, SamplingParams,
    StreamEventContract, StreamEventKind, StreamEventPayload, Tool, ToolChoice, ToolChoiceMode,
    VendorExtras,
};
use contract_bridge::error::ErrorKind;
use contract_bridge::logging::{LogSink, SharedLogger};
use contract_bridge::translate::openai_types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatToolChoice, ChunkDelta,
};
use contract_bridge::translate::streaming::sse_data;
use contract_bridge::translate::{
    decode_payload, RequestTranslator, ResponseTranslator, StreamTranslator,
};
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

fn chat_request() -> Value {
    json!({
        "model": "gpt-4o",
        "messages": [
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": "What's the weather in Paris?"},
            {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}
                }]
            },
            {"role": "tool", "tool_call_id": "call_1", "content": "18C and sunny"}
        ],
        "temperature": 0.3,
        "max_completion_tokens": 256,
        "stop": ["\n\n"],
        "tools": [{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Current weather for a city",
                "parameters": {"type": "object", "properties": {"city": {"type": "string"}}}
            }
        }],
        "tool_choice": "auto",
        "parallel_tool_calls": false,
        "user": "user-42",
        "store": true
    })
}

fn chunk(value: Value) -> ChatCompletionChunk {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_request_wire_round_trip() {
    let req: ChatCompletionRequest = serde_json::from_value(chat_request()).unwrap();
    let translator = RequestTranslator::new();

    let contract = translator.to_contract(&req).unwrap();
    assert_eq!(contract.messages.len(), 3);
    assert!(contract.system.is_some());
    assert_eq!(contract.sampling.max_output_tokens, Some(256));

    let back = translator.from_contract(&contract).unwrap();
    assert_eq!(serde_json::to_value(&back).unwrap(), serde_json::to_value(&req).unwrap());
}

#[test]
fn test_contract_survives_wire_trip() {
    let req: ChatCompletionRequest = serde_json::from_value(chat_request()).unwrap();
    let translator = RequestTranslator::new();
    let contract = translator.to_contract(&req).unwrap();

    let again = translator
        .to_contract(&translator.from_contract(&contract).unwrap())
        .unwrap();
    assert_eq!(again, contract);
}

#[test]
fn test_auto_tool_choice_round_trips() {
    let req: ChatCompletionRequest = serde_json::from_value(chat_request()).unwrap();
    let translator = RequestTranslator::new();

    let contract = translator.to_contract(&req).unwrap();
    assert_eq!(contract.tool_choice, Some(ToolChoice::Mode(ToolChoiceMode::Auto)));

    let back = translator.from_contract(&contract).unwrap();
    assert_eq!(back.tool_choice, Some(ChatToolChoice::Mode("auto".to_string())));
}

#[test]
fn test_web_search_tool_is_rejected() {
    let contract = RequestContract {
        model: "gpt-4o".to_string(),
        tools: vec![Tool::Hosted(HostedTool {
            tool_type: "web_search".to_string(),
            extras: VendorExtras::default(),
        })],
        ..RequestContract::default()
    };

    let err = RequestTranslator::new().from_contract(&contract).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_logit_bias_keys_become_token_ids() {
    let logger = SharedLogger::in_memory();
    let translator = RequestTranslator::new().with_logger(Arc::new(logger.clone()));
    let req: ChatCompletionRequest = serde_json::from_value(json!({
        "model": "gpt-4o",
        "messages": [{"role": "user", "content": "hi"}],
        "logit_bias": {"1": 2, "not-a-token": 5}
    }))
    .unwrap();

    let contract = translator.to_contract(&req).unwrap();
    let bias = contract.sampling.logit_bias.unwrap();
    assert_eq!(bias.len(), 1);
    assert_eq!(bias.get(&1), Some(&2.0));
    assert!(!logger.recent(10).is_empty());
}

#[test]
fn test_role_only_chunk_starts_message() {
    let events = StreamTranslator::new()
        .to_contract(&chunk(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{"index": 0, "delta": {"role": "assistant"}, "finish_reason": null}]
        })))
        .unwrap();

    assert_eq!(events.len(), 1);
    match &events[0].payload {
        StreamEventPayload::MessageStart(start) => assert_eq!(start.role, Role::Assistant),
        other => panic!("expected message start, got {other:?}"),
    }
}

#[test]
fn test_final_chunk_splits_into_delta_and_stop() {
    let events = StreamTranslator::new()
        .to_contract(&chunk(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{"index": 0, "delta": {"content": "hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        })))
        .unwrap();

    assert_eq!(events.len(), 2);
    match &events[0].payload {
        StreamEventPayload::MessageDelta(delta) => {
            assert_eq!(delta.content.as_deref(), Some("hi"));
            assert!(delta.tool_calls.is_empty());
        }
        other => panic!("expected delta, got {other:?}"),
    }
    match &events[1].payload {
        StreamEventPayload::MessageStop(stop) => {
            assert_eq!(stop.finish_reason, Some(FinishReason::Stop));
            assert_eq!(stop.usage.as_ref().unwrap().total_tokens, 4);
        }
        other => panic!("expected stop, got {other:?}"),
    }
}

#[test]
fn test_stop_event_becomes_bare_chunk() {
    let event = StreamEventContract::new(StreamEventPayload::MessageStop(MessageStop {
        finish_reason: Some(FinishReason::Stop),
        usage: Some(ResponseUsage {
            prompt_tokens: 3,
            completion_tokens: 1,
            total_tokens: 4,
            extras: VendorExtras::default(),
        }),
    }));

    let chunk = StreamTranslator::new().from_contract(&event).unwrap();
    assert_eq!(chunk.choices.len(), 1);
    assert_eq!(chunk.choices[0].delta, ChunkDelta::default());
    assert_eq!(chunk.choices[0].finish_reason.as_deref(), Some("stop"));
    assert_eq!(chunk.usage.unwrap().completion_tokens, 1);
}

#[test]
fn test_sse_transcript_through_event_adapter() {
    let transcript = [
        ": keep-alive",
        r#"data: {"id":"c1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#,
        "",
        r#"data: {"id":"c1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        r#"data: {"id":"c1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"lo"},"finish_reason":"stop"}]}"#,
        "data: [DONE]",
    ];

    let frames = stream::iter(
        transcript
            .iter()
            .filter_map(|line| sse_data(line))
            .map(decode_payload)
            .collect::<Vec<_>>(),
    );
    let translator = StreamTranslator::new();
    let events: Vec<_> = futures::executor::block_on(translator.events(frames).collect());

    let kinds: Vec<_> = events
        .iter()
        .map(|e| e.as_ref().unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            StreamEventKind::MessageStart,
            StreamEventKind::MessageDelta,
            StreamEventKind::MessageDelta,
            StreamEventKind::MessageStop,
        ]
    );

    let text: String = events
        .iter()
        .filter_map(|e| match &e.as_ref().unwrap().payload {
            StreamEventPayload::MessageDelta(delta) => delta.content.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello");
}

#[test]
fn test_legacy_function_call_response() {
    let resp: ChatCompletionResponse = serde_json::from_value(json!({
        "id": "chatcmpl-7",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "function_call": {"name": "get_weather", "arguments": "{}"}
            },
            "finish_reason": "function_call"
        }]
    }))
    .unwrap();
    let translator = ResponseTranslator::new();

    let mut contract = translator.to_contract(&resp).unwrap();
    assert_eq!(contract.choices[0].message.tool_calls[0].name, "get_weather");
    assert_eq!(contract.choices[0].finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(translator.from_contract(&contract).unwrap(), resp);

    contract.choices[0].extras = VendorExtras::default();
    contract.choices[0].message.tool_calls[0].extras = VendorExtras::default();
    contract.choices[0].native_finish_reason = None;
    let modern = translator.from_contract(&contract).unwrap();
    assert!(modern.choices[0].message.function_call.is_none());
    assert_eq!(modern.choices[0].message.tool_calls.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_config_file_drives_translators() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        "[request]\nlegacy_max_tokens = true\n\n[response]\nmixed_content = \"omit\"\n"
    )
    .unwrap();

    let config = BridgeConfig::find_and_load(Some(f.path())).unwrap();
    assert_eq!(config.response.mixed_content, MixedContentPolicy::Omit);
    assert_eq!(config.response.part_separator, "\n");

    let translator = RequestTranslator::new().with_config(config.request);
    let contract = RequestContract {
        model: "gpt-4o".to_string(),
        sampling: SamplingParams {
            max_output_tokens: Some(64),
            ..Default::default()
        },
        ..RequestContract::default()
    };
    let wire = translator.from_contract(&contract).unwrap();
    assert_eq!(wire.max_tokens, Some(64));
    assert_eq!(wire.max_completion_tokens, None);
}

#[test]
fn test_logger_reloads_jsonl_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("bridge.jsonl");

    {
        let logger = SharedLogger::new(&path).unwrap();
        logger.info("request", "first".to_string());
        logger.warn("response", "second".to_string());
    }

    let reloaded = SharedLogger::new(&path).unwrap();
    let recent = reloaded.recent(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "second");
    assert_eq!(recent[1].component, "request");
}

#[test]
fn test_usage_details_survive_as_extras() {
    let resp: ChatCompletionResponse = serde_json::from_value(json!({
        "id": "chatcmpl-8",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "ok"},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 2,
            "total_tokens": 12,
            "completion_tokens_details": {"reasoning_tokens": 0}
        }
    }))
    .unwrap();
    let translator = ResponseTranslator::new();

    let contract = translator.to_contract(&resp).unwrap();
    let usage = contract.usage.as_ref().unwrap();
    assert_eq!(usage.total_tokens, 12);
    assert!(usage.extras.fields().contains_key("completion_tokens_details"));

    assert_eq!(translator.from_contract(&contract).unwrap(), resp);
}
