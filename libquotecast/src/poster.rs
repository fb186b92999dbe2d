//! Quote posting orchestration
//!
//! The attempt loop: sample an author against the full history, sample one
//! of their quotes against that author's multiset, partition it, publish the
//! chunks strictly in order as a reply thread, then record the quote hash.
//! Selection failures skip the attempt and back off; once the first chunk is
//! live the attempt is committed and any later failure is terminal, since
//! posts on an external service cannot be rolled back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chunker::{Partitioner, POST_BUDGET};
use crate::config::Settings;
use crate::error::{QuotecastError, Result, SkipError};
use crate::history::{quote_hash, HistoryStore};
use crate::publish::Publisher;
use crate::segment::{RuleSplitter, SentenceSplit};
use crate::sources::QuoteSource;
use crate::types::{PostReceipt, Published};
use crate::weights::{compute_weights, sample_index};

/// Posts exactly one quote per run, retrying skipped attempts with a capped
/// jittered backoff
pub struct QuotePoster {
    source: Box<dyn QuoteSource>,
    publisher: Box<dyn Publisher>,
    store: HistoryStore,
    splitter: Box<dyn SentenceSplit + Send + Sync>,
    partitioner: Partitioner,
    authors: Vec<String>,
    username: Option<String>,
    penalize: f64,
    max_retries: u32,
    backoff_cap: Duration,
    rng: Mutex<StdRng>,
}

impl QuotePoster {
    pub fn new(
        settings: &Settings,
        source: Box<dyn QuoteSource>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            source,
            publisher,
            store: HistoryStore::new(&settings.hist_file),
            splitter: Box::new(RuleSplitter),
            partitioner: Partitioner::new(POST_BUDGET, settings.max_sents, settings.max_chars),
            authors: settings.authors.clone(),
            username: settings.username.clone(),
            penalize: settings.penalize,
            max_retries: settings.max_retries,
            backoff_cap: settings.backoff_cap,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the sampler's randomness, for deterministic tests
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Run the bounded attempt loop until one quote is posted
    ///
    /// # Errors
    ///
    /// Fails fatally before any attempt when the author list is empty, with
    /// [`QuotecastError::ExhaustedRetries`] when every attempt was skipped,
    /// and with the underlying error on any publish or store failure.
    pub async fn run(&self) -> Result<PostReceipt> {
        if self.authors.is_empty() {
            return Err(QuotecastError::InvalidInput(
                "author list is empty".to_string(),
            ));
        }

        let mut retries = 0u32;
        loop {
            match self.attempt().await {
                Ok(receipt) => {
                    info!(
                        author = %receipt.author,
                        posts = receipt.post_ids.len(),
                        "posted quote"
                    );
                    return Ok(receipt);
                }
                Err(QuotecastError::Skip(skip)) => {
                    retries += 1;
                    warn!(author = skip.author(), reason = %skip, retries, "skipped attempt");
                    if retries >= self.max_retries {
                        return Err(QuotecastError::ExhaustedRetries { attempts: retries });
                    }
                    let wait = self.backoff(retries);
                    debug!(wait_ms = wait.as_millis() as u64, "backing off");
                    sleep(wait).await;
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// One attempt: select, publish, register
    async fn attempt(&self) -> Result<PostReceipt> {
        // history is re-read at the start of every attempt so a run sees its
        // own (or a concurrent cron sibling's) earlier appends
        let history = self.store.load(&self.authors)?;
        let histories: Vec<Vec<String>> = self
            .authors
            .iter()
            .map(|author| history[author].clone())
            .collect();

        let author_weights = compute_weights(&histories, self.penalize);
        let author_index = self.draw(&author_weights);
        let author = &self.authors[author_index];
        let author_history = &histories[author_index];
        debug!(%author, history_len = author_history.len(), "selected author");

        let quotes = self.source.lookup(author).await?;
        if quotes.is_empty() {
            return Err(SkipError::AuthorNotFound {
                author: author.clone(),
            }
            .into());
        }
        let quote = self.pick_quote(&quotes, author_history);
        debug!(%author, %quote, "selected quote");

        let chunks = self.partitioner.partition(
            author,
            &quote,
            self.username.as_deref(),
            self.splitter.as_ref(),
        )?;

        let mut post_ids = Vec::with_capacity(chunks.len());
        let mut previous: Option<Published> = None;
        for chunk in &chunks {
            let reply = previous.as_ref().map(Published::as_reply_ref);
            let reply_handle = reply
                .as_ref()
                .and_then(|r| r.handle.clone())
                .or_else(|| self.username.clone());

            let text = chunk.decorate(reply_handle.as_deref());
            let published = self.publisher.publish(&text, reply.as_ref()).await?;
            debug!(post_id = %published.post_id, index = chunk.index, "published chunk");
            post_ids.push(published.post_id.clone());
            previous = Some(published);
        }

        // the only state mutation: record the posted quote
        let hash = quote_hash(&quote);
        self.store.append(author, &hash)?;

        Ok(PostReceipt {
            author: author.clone(),
            quote,
            quote_hash: hash,
            post_ids,
        })
    }

    /// Weight the author's quotes by how often each has been posted before
    fn pick_quote(&self, quotes: &[String], author_history: &[String]) -> String {
        let histories: Vec<Vec<String>> = quotes
            .iter()
            .map(|q| {
                let hash = quote_hash(q);
                author_history
                    .iter()
                    .filter(|recorded| **recorded == hash)
                    .cloned()
                    .collect()
            })
            .collect();

        let weights = compute_weights(&histories, self.penalize);
        quotes[self.draw(&weights)].clone()
    }

    fn draw(&self, weights: &[f64]) -> usize {
        let mut rng = self.rng.lock().unwrap();
        sample_index(weights, &mut *rng)
    }

    /// Linearly growing, jittered, capped wait between attempts
    fn backoff(&self, retries: u32) -> Duration {
        let jitter: f64 = self.rng.lock().unwrap().gen_range(0.0..2.0);
        let secs = (retries as f64 * jitter).min(self.backoff_cap.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::mock::MockPublisher;
    use crate::sources::mock::MockSource;
    use tempfile::TempDir;

    fn settings(dir: &TempDir, authors: &[&str]) -> Settings {
        Settings {
            username: Some("quotebot".to_string()),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            instance: "https://mastodon.social".to_string(),
            hist_file: dir.path().join("history"),
            max_sents: 3,
            max_chars: 500,
            max_retries: 5,
            penalize: 2.0,
            backoff_cap: Duration::from_secs(0),
            access_token: None,
        }
    }

    #[tokio::test]
    async fn test_empty_author_list_is_fatal_not_retryable() {
        let dir = TempDir::new().unwrap();
        let poster = QuotePoster::new(
            &settings(&dir, &[]),
            Box::new(MockSource::with_quotes(&["A quote."])),
            Box::new(MockPublisher::success("quotebot")),
        );

        let err = poster.run().await.unwrap_err();
        assert!(matches!(err, QuotecastError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_quote_list_is_a_skip() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::with_quotes(&[]);
        let poster = QuotePoster::new(
            &settings(&dir, &["Seneca"]),
            Box::new(source),
            Box::new(MockPublisher::success("quotebot")),
        );

        let err = poster.run().await.unwrap_err();
        assert!(matches!(err, QuotecastError::ExhaustedRetries { attempts: 5 }));
    }

    #[tokio::test]
    async fn test_backoff_respects_cap() {
        let dir = TempDir::new().unwrap();
        let mut config = settings(&dir, &["Seneca"]);
        config.backoff_cap = Duration::from_millis(250);
        let poster = QuotePoster::new(
            &config,
            Box::new(MockSource::with_quotes(&["A quote."])),
            Box::new(MockPublisher::success("quotebot")),
        );

        for retries in 1..=100 {
            assert!(poster.backoff(retries) <= Duration::from_millis(250));
        }
    }

    #[tokio::test]
    async fn test_backoff_grows_with_retry_count_before_cap() {
        let dir = TempDir::new().unwrap();
        let mut config = settings(&dir, &["Seneca"]);
        config.backoff_cap = Duration::from_secs(3600);
        let poster = QuotePoster::new(
            &config,
            Box::new(MockSource::with_quotes(&["A quote."])),
            Box::new(MockPublisher::success("quotebot")),
        );

        // jitter is uniform in [0, 2), so retries bound the wait linearly
        for retries in 1..=10 {
            assert!(poster.backoff(retries) < Duration::from_secs(2 * retries as u64));
        }
    }
}
