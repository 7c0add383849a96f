//! Opaque speech and language-model service seams.
//!
//! Speech-to-text, text-to-speech, and language-model inference are hosted
//! services consumed as black boxes. The agent configures them with a model
//! or voice name and asks only one thing of each: produce the transcript,
//! the audio, or the next action. Mock implementations ship for tests and
//! the offline console demo.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// A rendered tool result fed back into the conversation.
    Tool,
}

/// One turn of the conversation log.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// What the model wants to happen next.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelAction {
    /// Speak this text to the user.
    Say(String),
    /// Invoke a named tool with a free-form argument object.
    CallTool { name: String, args: Value },
}

/// Hosted speech-to-text service.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio buffer to text.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, AgentError>;

    /// Model identifier passed through to the service.
    fn model(&self) -> &str;
}

/// Hosted text-to-speech service.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize one chunk of text to audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AgentError>;

    /// Voice identifier passed through to the service.
    fn voice(&self) -> &str;
}

/// Hosted language model deciding the next conversational action.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn next_action(&self, conversation: &[Turn]) -> Result<ModelAction, AgentError>;
}

/// Split reply text into synthesis-sized chunks.
///
/// Splits on character boundaries, never inside a code point.
pub fn chunk_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() || max_chars == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// Text-to-speech that produces no audio. Used by the console demo and in
/// tests where only the text path matters.
#[derive(Debug, Default)]
pub struct NullTextToSpeech;

#[async_trait]
impl TextToSpeech for NullTextToSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, AgentError> {
        Ok(Vec::new())
    }

    fn voice(&self) -> &str {
        "null"
    }
}
