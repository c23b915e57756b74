//! Test helpers shared across Jarvis crates.

pub mod embedding;
pub mod generator;
pub mod memory;
pub mod web;

pub use embedding::FixedEmbedder;
pub use generator::{FailingGenerator, FixedGenerator, GenerationCall, ScriptedGenerator};
pub use memory::StubMemory;
pub use web::StubWebProvider;
