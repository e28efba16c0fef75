//! Generation backends for Storybook.
//!
//! [`GeminiGateway`] implements `storybook_core::GenerationGateway` on top of
//! [`GeminiApiAgent`], answering from [`fallback`] whenever the backend is
//! unavailable or misbehaves.

pub mod error;
pub mod fallback;
pub mod gateway;
pub mod gemini_api_agent;
pub mod prompts;
pub mod story_parser;

pub use error::AgentError;
pub use gateway::GeminiGateway;
pub use gemini_api_agent::GeminiApiAgent;
pub use story_parser::parse_story_structure;
