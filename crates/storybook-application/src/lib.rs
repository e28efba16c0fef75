//! Application layer for Storybook.
//!
//! Coordinates the generation gateway with the command-driven document in
//! `storybook-core`.

pub mod story_usecase;

pub use story_usecase::{CompletePage, CompleteStory, StoryUseCase};
