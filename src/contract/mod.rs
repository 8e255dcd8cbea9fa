//! The vendor-neutral contract.
//!
//! Every value here is plain owned data. Vendor-specific keys with no contract
//! slot ride along in [`VendorExtras`] bags; stream events additionally carry
//! namespaced [`Extensions`].

pub mod extras;
pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use extras::{Extensions, ExtraFields, KnownFields, Vendor, VendorExtras};
pub use message::{
    Annotation, AudioPart, Content, ContentPart, FilePart, ImagePart, Message, RefusalPart, Role,
    TextPart, ToolCall, ToolCallKind, UnknownPart, UrlCitation,
};
pub use request::{RequestContract, SamplingParams, StopCondition, StreamOptions, SystemInstruction};
pub use response::{
    FinishReason, ResponseChoice, ResponseContract, ResponseLogprobs, ResponseMessage,
    ResponseToolCall, ResponseUsage, TokenLogprob, TopLogprob,
};
pub use stream::{
    MessageDelta, MessageStart, MessageStop, StreamError, StreamEventContract, StreamEventKind,
    StreamEventPayload, ToolCallDelta,
};
pub use tool::{
    CustomTool, FunctionTool, HostedTool, HostedToolKind, ResponseFormat, Tool, ToolChoice,
    ToolChoiceMode,
};
