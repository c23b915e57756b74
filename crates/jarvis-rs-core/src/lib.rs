//! Core request pipeline for Jarvis.
//!
//! This crate owns the response cache, the generation backend, the reflection
//! pass, the memory-store adapter, and the orchestrator that sequences them
//! into one answer per prompt.

pub mod cache;
pub mod error;
pub mod generator;
pub mod memory;
pub mod orchestrator;
pub mod reflection;

pub use cache::ResponseCache;
pub use error::{GenerationError, JarvisCoreError};
pub use generator::{Generator, OpenRouterGenerator};
pub use memory::MemoryStore;
pub use orchestrator::{AskReply, Orchestrator, OrchestratorBuilder, steps};
pub use reflection::{ReflectionPolicy, Reflector, critique_prompt};
