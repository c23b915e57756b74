//! Memory record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stored answer keyed by the prompt that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Lowercase hex SHA-256 of the originating prompt.
    pub id: String,
    /// Stored answer text.
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a record for `prompt` holding `text`.
    pub fn new(prompt: &str, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: record_id(prompt),
            text: text.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derive the stable record id for a prompt.
pub fn record_id(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}
