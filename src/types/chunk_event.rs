use serde::{Deserialize, Serialize};

/// One deserialized server-sent event from a streamed chat completion.
///
/// Ephemeral: decoded from a single `data:` line and discarded once its text
/// deltas have been emitted. Fields the decoder does not act on (id, object,
/// created, model) are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEvent {
    /// The choices carried by this chunk. In practice a single element, but
    /// every element is honored in array order.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// One choice within a streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// The incremental payload for this choice.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Why generation stopped, present only on the final chunk of a choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The incremental payload of one choice.
///
/// The first delta of a stream typically carries only `role`; the last
/// carries neither field. Only non-empty `content` produces output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role announcement, present only on the first delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The text fragment, absent on role-only and finish-only deltas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChunkEvent {
    /// Returns the non-empty content fragments of this chunk, in choice order.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.choices
            .iter()
            .filter_map(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_content_delta() {
        let json = r#"{"id":"chatcmpl-123","object":"chat.completion.chunk","created":1694268190,"model":"gpt-4","choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        let event: ChunkEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.fragments().collect::<Vec<_>>(), vec!["Hello"]);
    }

    #[test]
    fn role_only_delta_has_no_fragments() {
        let json = r#"{"choices":[{"index":0,"delta":{"role":"assistant"},"finish_reason":null}]}"#;
        let event: ChunkEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.fragments().count(), 0);
    }

    #[test]
    fn finish_only_delta_has_no_fragments() {
        let json = r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        let event: ChunkEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.fragments().count(), 0);
        assert_eq!(event.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn empty_content_is_filtered() {
        let json = r#"{"choices":[{"index":0,"delta":{"content":""},"finish_reason":null}]}"#;
        let event: ChunkEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.fragments().count(), 0);
    }

    #[test]
    fn multiple_choices_emit_in_order() {
        let json = r#"{"choices":[{"index":0,"delta":{"content":"a"}},{"index":1,"delta":{"content":"b"}}]}"#;
        let event: ChunkEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.fragments().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn missing_choices_deserializes_empty() {
        let event: ChunkEvent = serde_json::from_str("{}").unwrap();
        assert!(event.choices.is_empty());
    }
}
