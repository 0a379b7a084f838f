//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module handles parsing of the newline-delimited `data: {...}` stream
//! produced by OpenAI-compatible chat-completion endpoints, converting raw
//! byte streams into text fragments.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::types::ChunkEvent;

/// The line that marks the end of the stream.
const DONE_SENTINEL: &str = "data: [DONE]";

/// The prefix carried by every data line.
const DATA_PREFIX: &str = "data: ";

/// What one trimmed line contributes to the output.
enum Line {
    /// Text fragments to emit, in choice order. May be empty for role-only
    /// or finish-reason-only chunks.
    Fragments(Vec<String>),
    /// The `[DONE]` sentinel: decoding ends, later lines are not read.
    Done,
    /// Empty or non-data line: contributes nothing.
    Skip,
}

/// Process a stream of bytes into a stream of text fragments.
///
/// This function takes a byte stream from an HTTP response and yields the
/// non-empty `delta.content` fragments of each chunk, in order. The stream is
/// finite: it ends at end-of-stream or at the `data: [DONE]` sentinel, both
/// of which are normal termination. A malformed `data:` line yields an
/// `Err` and ends the stream; the wire contract is not renegotiated line by
/// line.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let state = DecodeState {
        stream,
        buffer: String::new(),
        pending: VecDeque::new(),
        finished: false,
        drained: false,
    };

    stream::unfold(state, move |mut state| async move {
        loop {
            // Emit fragments already decoded before reading further.
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished {
                return None;
            }

            // Process the next complete line in the buffer.
            if let Some(line) = next_line(&mut state.buffer) {
                match decode_line(&line) {
                    Ok(Line::Fragments(fragments)) => {
                        state.pending.extend(fragments);
                    }
                    Ok(Line::Done) => {
                        state.finished = true;
                    }
                    Ok(Line::Skip) => {}
                    Err(e) => {
                        // Fatal: one bad line means the format changed.
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                }
                continue;
            }

            if state.drained {
                state.finished = true;
                continue;
            }

            // Read more data
            match state.stream.next().await {
                Some(Ok(bytes)) => match std::str::from_utf8(&bytes) {
                    Ok(text) => state.buffer.push_str(text),
                    Err(e) => {
                        state.finished = true;
                        return Some((
                            Err(Error::encoding(
                                format!("Invalid UTF-8 in stream: {e}"),
                                Some(Box::new(e)),
                            )),
                            state,
                        ));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    // End of stream: a trailing line without a final newline
                    // still gets decoded.
                    state.drained = true;
                    if !state.buffer.is_empty() {
                        state.buffer.push('\n');
                    }
                }
            }
        }
    })
}

/// Decoder state threaded through the unfold.
struct DecodeState<S> {
    stream: S,
    buffer: String,
    pending: VecDeque<String>,
    finished: bool,
    drained: bool,
}

/// Remove and return the next newline-terminated line from the buffer.
fn next_line(buffer: &mut String) -> Option<String> {
    let newline = buffer.find('\n')?;
    let line = buffer[..newline].to_string();
    buffer.drain(..=newline);
    Some(line)
}

/// Decode one line of the SSE body.
///
/// Lines are trimmed of surrounding whitespace first, which also tolerates
/// `\r\n` endings. Lines without the `data: ` prefix are skipped, not
/// errors.
fn decode_line(line: &str) -> Result<Line> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Line::Skip);
    }
    if line == DONE_SENTINEL {
        return Ok(Line::Done);
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(Line::Skip);
    };

    let event = serde_json::from_str::<ChunkEvent>(payload).map_err(|e| {
        Error::serialization(format!("Failed to parse chunk JSON: {e}"), Some(Box::new(e)))
    })?;
    Ok(Line::Fragments(
        event.fragments().map(str::to_string).collect(),
    ))
}
