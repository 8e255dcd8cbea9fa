//! Translation between the `OpenAI` Chat Completions dialect and the contract.
//!
//! Requests, responses and streaming chunks each get a translator with a
//! `to_contract` / `from_contract` pair. All translation functions are pure
//! (no I/O); diagnostics go to the injected [`LogSink`](crate::logging::LogSink).

pub mod openai_types;
pub mod request;
pub mod response;
pub mod streaming;

pub use request::RequestTranslator;
pub use response::ResponseTranslator;
pub use streaming::{decode_payload, ChatStreamFrame, StreamTranslator};

use serde_json::Value;

use crate::contract::extras::{strip_known, ExtraFields, KnownFields, Vendor, VendorExtras};
use crate::logging::LogSink;

/// The vendor every translator in this module reads and writes extras for.
pub const VENDOR: Vendor = Vendor::OpenAiChat;

/// Marks a tool call (or choice) that used the deprecated `function_call` shape.
pub const LEGACY_FUNCTION_CALL_KEY: &str = "legacy_function_call";

/// Residual keys of a nested wire object (`image_url`, `function`, ...),
/// stored as one object inside the owner's extras.
pub const NESTED_EXTRAS_KEY: &str = "nested_extras";

fn inbound_extras(fields: &ExtraFields) -> VendorExtras {
    VendorExtras::from_fields(VENDOR, fields.clone())
}

fn inbound_nested_extras(outer: &ExtraFields, nested: &ExtraFields) -> VendorExtras {
    let mut fields = outer.clone();
    if !nested.is_empty() {
        fields.insert(NESTED_EXTRAS_KEY.to_string(), Value::Object(nested.clone()));
    }
    VendorExtras::from_fields(VENDOR, fields)
}

/// Chat-sourced extras for a wire object of type `T`, minus marker keys and
/// anything `T` declares itself.
fn outbound_extras<T: KnownFields>(
    extras: &VendorExtras,
    markers: &[&str],
    log: &dyn LogSink,
) -> ExtraFields {
    let mut residual = extras.residual_for(VENDOR, markers);
    residual.remove(NESTED_EXTRAS_KEY);
    strip_known::<T>(&residual, log)
}

fn outbound_nested_extras<T: KnownFields>(extras: &VendorExtras, log: &dyn LogSink) -> ExtraFields {
    match extras.get(VENDOR, NESTED_EXTRAS_KEY) {
        Some(Value::Object(nested)) => strip_known::<T>(nested, log),
        _ => ExtraFields::new(),
    }
}
