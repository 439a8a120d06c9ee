//! Data model for one support conversation.
//!
//! There are two related formats in play: the internal message history the
//! session owns, and the OpenAI chat-completions wire format. The internal
//! structs here are the source of truth; the providers module converts them
//! to and from the wire shapes at the endpoint boundary.
pub mod message;
pub mod tool;
