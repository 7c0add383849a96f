//! Conversational agent runtime for Parlance.
//!
//! Provides per-conversation session state, tolerant tool-argument
//! normalization, the tool dispatch registry, opaque speech/LLM service
//! seams, and the session orchestrator that ties them together.

pub mod agent;
pub mod args;
pub mod error;
pub mod keyword;
pub mod session;
pub mod speech;
pub mod tools;

pub use agent::AgentSession;
pub use args::ToolArgs;
pub use error::AgentError;
pub use keyword::KeywordModel;
pub use session::{CollectPhase, SessionManager, SessionState, REQUIRED_LEAD_FIELDS};
pub use speech::{
    chunk_for_tts, LanguageModel, ModelAction, NullTextToSpeech, Role, SpeechToText, TextToSpeech,
    Turn,
};
pub use tools::{
    BrowseProducts, CaptureLead, GetLastOrder, GetOrderHistory, LogCheckIn, PlaceOrder,
    ToolHandler, ToolRegistry, ToolReply,
};
