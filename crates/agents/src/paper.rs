//! Paper search through the arXiv Atom API.
//!
//! API: http://export.arxiv.org/api/query?search_query=all:electron&start=0&max_results=3

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;
use std::time::Duration;
use switchboard_core::{AppError, AppResult};

use crate::agent::RetrievalAgent;
use crate::types::{AgentId, AgentOutput};

pub const PAPER_SOURCE: &str = "ArXiv Search";
pub const NO_PAPER_RESULTS: &str = "No good Arxiv Result was found";

/// Upper bound on the rendered context, in characters.
pub const MAX_CONTEXT_CHARS: usize = 4000;

/// One `<entry>` of the Atom feed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaperEntry {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

impl PaperEntry {
    fn render(&self) -> String {
        let date = self.published.get(..10).unwrap_or(&self.published);
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            date,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

/// arXiv search agent.
pub struct PaperAgent {
    endpoint: String,
    max_results: usize,
    client: reqwest::Client,
}

impl PaperAgent {
    pub fn new(endpoint: impl Into<String>, max_results: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_results,
            client: reqwest::Client::new(),
        }
    }

    /// Bound every request by `secs` seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }
}

/// Strip routing phrases from a question before searching.
///
/// Falls back to the trimmed question when nothing else is left.
pub fn clean_query(query: &str) -> String {
    let cleaned = query.replace("latest papers on", "").replace("arxiv", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        query.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// Parse the entries of an arXiv Atom feed.
pub fn parse_feed(xml: &str) -> AppResult<Vec<PaperEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PaperEntry> = None;
    let mut in_author = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "entry" => current = Some(PaperEntry::default()),
                    "author" => in_author = true,
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Text(e)) => {
                let chunk = e.unescape().unwrap_or_default();
                text.push_str(&chunk);
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "entry" {
                    entries.extend(current.take());
                } else if let Some(entry) = current.as_mut() {
                    let value = collapse_whitespace(&text);
                    match name.as_str() {
                        "published" => entry.published = value,
                        "title" => entry.title = value,
                        "summary" => entry.summary = value,
                        "name" if in_author && !value.is_empty() => entry.authors.push(value),
                        "author" => in_author = false,
                        _ => {}
                    }
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Retrieval(format!(
                    "Invalid arXiv feed at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(entries)
}

/// Render entries as agent context, bounded by [`MAX_CONTEXT_CHARS`].
pub fn render_entries(entries: &[PaperEntry]) -> String {
    let rendered = entries
        .iter()
        .map(PaperEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    match rendered.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((cut, _)) => rendered[..cut].to_string(),
        None => rendered,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl RetrievalAgent for PaperAgent {
    fn id(&self) -> AgentId {
        AgentId::Paper
    }

    async fn query(&self, text: &str) -> AppResult<AgentOutput> {
        let cleaned = clean_query(text);
        tracing::debug!(query = %cleaned, "Searching arXiv");

        let search = format!("all:{}", cleaned);
        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("search_query", search.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("arXiv request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "arXiv API error ({})",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read arXiv response: {}", e)))?;

        let mut entries = parse_feed(&body)?;
        entries.truncate(self.max_results);
        tracing::debug!(entries = entries.len(), "arXiv search finished");

        let context = if entries.is_empty() {
            NO_PAPER_RESULTS.to_string()
        } else {
            render_entries(&entries)
        };

        Ok(AgentOutput {
            context,
            metadata: json!({ "source": PAPER_SOURCE }),
        })
    }
}
