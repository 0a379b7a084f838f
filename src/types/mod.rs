// Public modules
pub mod chat_request;
pub mod chunk_event;
pub mod message;

// Re-exports
pub use chat_request::ChatRequest;
pub use chunk_event::{ChunkChoice, ChunkDelta, ChunkEvent};
pub use message::{ChatMessage, Role};
