//! DuckDuckGo instant-answer provider.

use crate::{SearchError, WebProvider};
use async_trait::async_trait;
use jarvis_rs_config::SearchConfig;
use jarvis_rs_protocol::SearchSnippet;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// A related topic entry; groups nest further topics under `Topics`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}

/// `WebProvider` backed by the DuckDuckGo instant-answer JSON API.
pub struct DuckDuckGoProvider {
    endpoint: String,
    http_client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SearchError::Request(err.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl WebProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchSnippet>, SearchError> {
        debug!(
            "duckduckgo search (query_len={}, limit={})",
            query.len(),
            limit
        );
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|err| SearchError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        // The API labels its JSON as application/x-javascript, so decode by hand.
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Request(err.to_string()))?;
        let answer: InstantAnswer =
            serde_json::from_str(&body).map_err(|err| SearchError::Decode(err.to_string()))?;
        Ok(snippets_from_answer(answer, query, limit))
    }
}

/// Flatten an instant answer into at most `limit` snippets.
pub(crate) fn snippets_from_answer(
    answer: InstantAnswer,
    query: &str,
    limit: usize,
) -> Vec<SearchSnippet> {
    let fallback_title = if answer.heading.trim().is_empty() {
        query.trim().to_string()
    } else {
        answer.heading.trim().to_string()
    };

    let mut snippets = Vec::new();
    if !answer.abstract_text.trim().is_empty() {
        snippets.push(SearchSnippet::new(
            fallback_title.clone(),
            answer.abstract_text.trim(),
        ));
    }

    let mut texts = Vec::new();
    collect_topic_texts(&answer.related_topics, &mut texts);
    for text in texts {
        if snippets.len() >= limit {
            break;
        }
        let snippet = match text.split_once(" - ") {
            Some((title, body)) => SearchSnippet::new(title.trim(), body.trim()),
            None => SearchSnippet::new(fallback_title.clone(), text.trim()),
        };
        snippets.push(snippet);
    }
    snippets.truncate(limit);
    snippets
}

fn collect_topic_texts(topics: &[RelatedTopic], out: &mut Vec<String>) {
    for topic in topics {
        if let Some(text) = topic.text.as_deref().filter(|text| !text.trim().is_empty()) {
            out.push(text.to_string());
        }
        collect_topic_texts(&topic.topics, out);
    }
}

#[cfg(test)]
mod tests {
    use super::{InstantAnswer, snippets_from_answer};
    use jarvis_rs_protocol::SearchSnippet;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> InstantAnswer {
        serde_json::from_str(raw).expect("answer")
    }

    #[test]
    fn abstract_comes_first_then_flattened_topics() {
        let answer = parse(
            r#"{
                "Heading": "Rust (programming language)",
                "AbstractText": "Rust is a general-purpose programming language.",
                "RelatedTopics": [
                    {"Text": "Cargo - The Rust package manager.", "FirstURL": "https://duckduckgo.com/Cargo"},
                    {"Name": "Tools", "Topics": [
                        {"Text": "Clippy - A collection of lints."}
                    ]}
                ]
            }"#,
        );
        let snippets = snippets_from_answer(answer, "rust", 5);
        assert_eq!(
            snippets,
            vec![
                SearchSnippet::new(
                    "Rust (programming language)",
                    "Rust is a general-purpose programming language."
                ),
                SearchSnippet::new("Cargo", "The Rust package manager."),
                SearchSnippet::new("Clippy", "A collection of lints."),
            ]
        );
    }

    #[test]
    fn results_are_capped_at_limit() {
        let answer = parse(
            r#"{"RelatedTopics": [
                {"Text": "A - one"}, {"Text": "B - two"}, {"Text": "C - three"}
            ]}"#,
        );
        assert_eq!(snippets_from_answer(answer, "letters", 2).len(), 2);
    }

    #[test]
    fn empty_answer_yields_no_snippets() {
        let answer = parse(r#"{"Heading": "", "AbstractText": "", "RelatedTopics": []}"#);
        assert!(snippets_from_answer(answer, "nothing", 5).is_empty());
    }

    #[test]
    fn topic_without_separator_uses_heading_as_title() {
        let answer = parse(r#"{"Heading": "Tokio", "RelatedTopics": [{"Text": "Async runtime"}]}"#);
        let snippets = snippets_from_answer(answer, "tokio", 5);
        assert_eq!(snippets, vec![SearchSnippet::new("Tokio", "Async runtime")]);
    }
}
