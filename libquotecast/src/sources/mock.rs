//! Mock quote source for testing
//!
//! Scripted per-call outcomes let tests exercise the orchestrator's skip and
//! retry behavior without network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Result, SkipError};
use crate::sources::QuoteSource;

/// One scripted lookup outcome
#[derive(Debug, Clone)]
pub enum MockLookup {
    Quotes(Vec<String>),
    NotFound,
    Ambiguous,
    Unavailable(String),
}

/// Quote source that replays a script of outcomes
///
/// Outcomes are consumed in order; the final outcome repeats once the script
/// runs out, so a single-entry script behaves like a constant source. Clones
/// share the script and counters, letting tests keep a probe handle after
/// boxing the source into the poster.
#[derive(Clone)]
pub struct MockSource {
    script: Arc<Mutex<VecDeque<MockLookup>>>,
    lookup_count: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn scripted(outcomes: Vec<MockLookup>) -> Self {
        assert!(!outcomes.is_empty(), "mock source needs at least one outcome");
        Self {
            script: Arc::new(Mutex::new(outcomes.into())),
            lookup_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Source that always returns the same quotes
    pub fn with_quotes(quotes: &[&str]) -> Self {
        Self::scripted(vec![MockLookup::Quotes(
            quotes.iter().map(|q| q.to_string()).collect(),
        )])
    }

    /// Source that never knows any author
    pub fn not_found() -> Self {
        Self::scripted(vec![MockLookup::NotFound])
    }

    /// Number of lookups performed so far
    pub fn lookup_count(&self) -> usize {
        *self.lookup_count.lock().unwrap()
    }

    fn next_outcome(&self) -> MockLookup {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl QuoteSource for MockSource {
    async fn lookup(&self, author: &str) -> Result<Vec<String>> {
        *self.lookup_count.lock().unwrap() += 1;

        match self.next_outcome() {
            MockLookup::Quotes(quotes) => Ok(quotes),
            MockLookup::NotFound => Err(SkipError::AuthorNotFound {
                author: author.to_string(),
            }
            .into()),
            MockLookup::Ambiguous => Err(SkipError::AuthorAmbiguous {
                author: author.to_string(),
            }
            .into()),
            MockLookup::Unavailable(reason) => Err(SkipError::SourceUnavailable {
                author: author.to_string(),
                reason,
            }
            .into()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
