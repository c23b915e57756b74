//! Decide whether a prompt needs a web search and derive the query.

use jarvis_rs_config::SearchConfig;
use std::collections::HashSet;

/// Split a prompt into lowercase alphanumeric tokens.
pub fn tokenize(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trigger words plus the words stripped when deriving a search query.
///
/// A token triggers when it starts with a trigger word, so inflections such as
/// "updates" or "searching" count while "research" does not.
#[derive(Debug, Clone)]
pub struct TriggerPolicy {
    triggers: Vec<String>,
    strip_words: Vec<String>,
}

impl TriggerPolicy {
    pub fn new<T, S>(triggers: T, strip_words: S) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut seen = HashSet::new();
        Self {
            triggers: triggers
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .filter(|word| !word.is_empty() && seen.insert(word.clone()))
                .collect(),
            strip_words: strip_words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.trigger_words, config.strip_words.clone())
    }

    fn trigger_for(&self, token: &str) -> Option<&str> {
        self.triggers
            .iter()
            .find(|trigger| token.starts_with(trigger.as_str()))
            .map(String::as_str)
    }

    /// True when any token of the prompt begins with a trigger word.
    pub fn matches(&self, prompt: &str) -> bool {
        tokenize(prompt)
            .iter()
            .any(|token| self.trigger_for(token).is_some())
    }

    /// Trigger words present in the prompt, in order of appearance.
    pub fn matched_words(&self, prompt: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        tokenize(prompt)
            .iter()
            .filter_map(|token| self.trigger_for(token))
            .filter(|trigger| seen.insert(*trigger))
            .map(str::to_string)
            .collect()
    }

    /// Remove the first literal occurrence of each strip word, then trim.
    pub fn derive_query(&self, prompt: &str) -> String {
        let mut query = prompt.to_string();
        for word in &self.strip_words {
            if let Some(idx) = query.find(word.as_str()) {
                query.replace_range(idx..idx + word.len(), "");
            }
        }
        query.trim().to_string()
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}
