pub mod config;
pub mod contract;
pub mod error;
pub mod logging;
pub mod translate;

pub use config::BridgeConfig;
pub use error::{ErrorKind, Result, TranslateError};
pub use logging::{LogSink, SharedLogger, SharedSink};
pub use translate::{RequestTranslator, ResponseTranslator, StreamTranslator};
