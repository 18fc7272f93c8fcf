pub mod client;
pub mod robustness;

pub use client::{system_message, user_message, ChatMessage, ChatRole, CompletionClient, Completions};
pub use robustness::{clean_response, default_payload, parse_payload, ParseFidelity, ParsedPayload};
