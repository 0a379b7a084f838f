use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Model used when the configuration does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// The fixed system instruction sent with every question.
pub const SYSTEM_INSTRUCTION: &str = "You are an AI assistant being used from a terminal. \
     Provide concise, direct responses optimized for command-line viewing. \
     Prioritize brevity and clarity. Use markdown formatting when helpful for readability. \
     Avoid unnecessary pleasantries or verbose explanations unless specifically requested.";

/// The body of a chat-completion request.
///
/// Constructed fresh per call and never mutated after serialization. The
/// `stream` flag is always true: the buffered ask operation consumes the same
/// streamed wire format and only differs in how the caller collects output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to generate with.
    pub model: String,

    /// The ordered messages of the request: one system instruction followed
    /// by the user's question.
    pub messages: Vec<ChatMessage>,

    /// Whether the response should be streamed. Always true on the wire.
    pub stream: bool,
}

impl ChatRequest {
    /// Builds the request for one question.
    ///
    /// An empty `model_name` falls back to [`DEFAULT_MODEL`]. The question is
    /// passed through verbatim.
    pub fn for_question(question: &str, model_name: &str) -> Self {
        let model = if model_name.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model_name.to_string()
        };
        ChatRequest {
            model,
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(question),
            ],
            stream: true,
        }
    }
}
