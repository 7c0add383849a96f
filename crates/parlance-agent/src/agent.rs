//! The conversational agent session.
//!
//! One `AgentSession` per caller. Each user transcript is appended to the
//! conversation log and handed to the language model, which either speaks
//! directly or requests a tool call. Tool replies are fed back into the log
//! in rendered form so the model sees structured results on later turns.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::args::ToolArgs;
use crate::error::AgentError;
use crate::speech::{chunk_for_tts, LanguageModel, ModelAction, TextToSpeech, Turn};
use crate::tools::ToolRegistry;

pub struct AgentSession {
    id: Uuid,
    registry: Arc<ToolRegistry>,
    model: Arc<dyn LanguageModel>,
    tts: Option<Arc<dyn TextToSpeech>>,
    turns: Vec<Turn>,
    greeting: String,
    chunk_chars: usize,
}

impl AgentSession {
    pub fn new(
        registry: Arc<ToolRegistry>,
        model: Arc<dyn LanguageModel>,
        greeting: impl Into<String>,
        chunk_chars: usize,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "Agent session started");
        Self {
            id,
            registry,
            model,
            tts: None,
            turns: Vec::new(),
            greeting: greeting.into(),
            chunk_chars,
        }
    }

    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Open the conversation with the configured greeting.
    pub fn greet(&mut self) -> String {
        self.turns.push(Turn::assistant(self.greeting.clone()));
        self.greeting.clone()
    }

    /// Process one user transcript and return the reply to speak.
    pub async fn handle_transcript(&mut self, transcript: &str) -> Result<String, AgentError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(AgentError::EmptyTranscript);
        }
        self.turns.push(Turn::user(transcript));

        match self.model.next_action(&self.turns).await? {
            ModelAction::Say(text) => {
                self.turns.push(Turn::assistant(text.clone()));
                Ok(text)
            }
            ModelAction::CallTool { name, args } => {
                debug!(session = %self.id, tool = %name, "Model requested tool call");
                let reply = self
                    .registry
                    .dispatch(self.id, &name, &ToolArgs::new(args));
                self.turns.push(Turn::tool(reply.render()));
                self.turns.push(Turn::assistant(reply.message.clone()));
                Ok(reply.message)
            }
        }
    }

    /// Synthesize a reply in chunks. Without a TTS backend this is a no-op.
    pub async fn speak(&self, text: &str) -> Result<Vec<Vec<u8>>, AgentError> {
        let Some(ref tts) = self.tts else {
            return Ok(Vec::new());
        };
        let mut audio = Vec::new();
        for chunk in chunk_for_tts(text, self.chunk_chars) {
            audio.push(tts.synthesize(&chunk).await?);
        }
        Ok(audio)
    }

    /// Close the session and discard its server-side state.
    pub fn end(self) -> bool {
        info!(session = %self.id, "Agent session ended");
        self.registry.sessions().end(self.id)
    }
}
