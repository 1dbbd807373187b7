//! Feasure agent: library crate for intent routing and saved-search building.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `feasure-e2e-tests`) can access types like `Dispatcher`,
//! `OpenAiClient`, and `ScriptedGenerationClient`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generation;
pub mod intent;
pub mod search;
pub mod vocabulary;

pub use dispatcher::Dispatcher;
pub use error::{AgentError, AgentResult, ErrorClass};
pub use generation::{GenerationClient, OpenAiClient, ResponseFormat, ScriptedGenerationClient};
pub use intent::IntentClassifier;
pub use search::SearchSpecBuilder;
pub use vocabulary::VocabularyRegistry;
