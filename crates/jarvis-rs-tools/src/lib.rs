//! Web search support for Jarvis.
//!
//! Provides the `WebProvider` seam, a DuckDuckGo implementation, the search
//! client that formats results for generation context, and the trigger policy
//! that decides when a prompt warrants a search.

pub mod duckduckgo;
pub mod error;
pub mod search;
pub mod trigger;
pub mod web;

pub use duckduckgo::DuckDuckGoProvider;
pub use error::SearchError;
pub use search::SearchClient;
pub use trigger::{TriggerPolicy, tokenize};
pub use web::WebProvider;
