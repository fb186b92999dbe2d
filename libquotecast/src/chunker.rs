//! Quote partitioning into post-sized chunks
//!
//! A quote that fits the post budget together with its attribution goes out
//! as a single undecorated post. Anything longer is split at sentence
//! boundaries, and any sentence that still overflows is greedily word-packed.
//! Because continuation chunks carry a numbering suffix and a reply-mention
//! prefix, the budget available to quote text changes with the chunk index;
//! the word packer therefore accepts a fresh budget on every call instead of
//! being handed one fixed value up front.

use crate::error::{QuotecastError, Result, SkipError};
use crate::segment::SentenceSplit;
use crate::types::Chunk;

/// Hard per-post character budget
pub const POST_BUDGET: usize = 140;

/// Reserved for the ` (NN/NN)` numbering suffix on multi-chunk partitions.
/// The sentence/length policy keeps chunk counts well under three digits.
const NUMBERING_RESERVE: usize = 8;

/// Maximum handle length on the platform, reserved for the `@handle `
/// mention prefix when the acting account is not known at partition time
const MAX_HANDLE_LEN: usize = 15;

/// Splits quotes into ordered chunks that respect the post budget
#[derive(Debug, Clone)]
pub struct Partitioner {
    budget: usize,
    max_sentences: usize,
    max_chars: usize,
}

impl Partitioner {
    pub fn new(budget: usize, max_sentences: usize, max_chars: usize) -> Self {
        Self {
            budget,
            max_sentences,
            max_chars,
        }
    }

    /// Partition `quote` into chunks whose decorated forms fit the budget
    ///
    /// `handle` is the acting account's handle when known; it sizes the
    /// mention-prefix reservation for continuation chunks. Quotes that
    /// exceed the sentence or length policy are rejected with a
    /// [`SkipError::QuoteRejected`], signaling the caller to abandon the
    /// attempt rather than post a wall of text.
    pub fn partition(
        &self,
        author: &str,
        quote: &str,
        handle: Option<&str>,
        splitter: &dyn SentenceSplit,
    ) -> Result<Vec<Chunk>> {
        if quote.trim().is_empty() {
            return Err(QuotecastError::InvalidInput(
                "cannot partition an empty quote".to_string(),
            ));
        }

        let attribution = format!("{}: ", author);
        let naked = format!("{}{}", attribution, quote);
        if naked.chars().count() <= self.budget {
            return Ok(vec![Chunk {
                body: naked,
                index: 0,
                total: 1,
            }]);
        }

        let sentences = splitter.split(quote);
        let quote_chars = quote.chars().count();
        if sentences.len() > self.max_sentences || quote_chars > self.max_chars {
            return Err(SkipError::QuoteRejected {
                author: author.to_string(),
                sentences: sentences.len(),
                chars: quote_chars,
            }
            .into());
        }

        let attribution_chars = attribution.chars().count();
        let mention_reserve = match handle {
            Some(h) => h.chars().count() + 2,
            None => MAX_HANDLE_LEN + 2,
        };

        let mut bodies: Vec<String> = Vec::new();
        for sentence in &sentences {
            let available = self.body_budget(bodies.len(), attribution_chars, mention_reserve);
            if sentence.chars().count() <= available {
                bodies.push(sentence.clone());
                continue;
            }

            // sentence overflows its slot: word-pack it, re-deriving the
            // budget as the chunk index advances
            let mut packer = WordPacker::new(sentence);
            loop {
                let available =
                    self.body_budget(bodies.len(), attribution_chars, mention_reserve);
                match packer.next_chunk(available) {
                    Some(piece) => bodies.push(piece),
                    None => break,
                }
            }
        }

        let total = bodies.len();
        Ok(bodies
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let body = if index == 0 {
                    format!("{}{}", attribution, text)
                } else {
                    text
                };
                Chunk { body, index, total }
            })
            .collect())
    }

    /// Budget left for quote text at a given chunk index
    ///
    /// Every chunk of a multi-chunk partition reserves the numbering suffix.
    /// The first chunk spends the attribution prefix; continuation chunks
    /// reserve the reply mention instead.
    fn body_budget(&self, index: usize, attribution_chars: usize, mention_reserve: usize) -> usize {
        let base = self.budget.saturating_sub(NUMBERING_RESERVE);
        if index == 0 {
            base.saturating_sub(attribution_chars)
        } else {
            base.saturating_sub(mention_reserve)
        }
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Self::new(
            POST_BUDGET,
            crate::config::DEFAULT_MAX_SENTS,
            crate::config::DEFAULT_MAX_CHARS,
        )
    }
}

/// Greedy word packer over one sentence, resumable with a per-call budget
///
/// Each call to [`WordPacker::next_chunk`] packs the largest prefix of the
/// remaining words that fits the supplied budget. A word that alone exceeds
/// the budget is emitted by itself rather than truncated; the resulting
/// overflow is accepted.
pub struct WordPacker<'a> {
    words: std::iter::Peekable<std::str::SplitWhitespace<'a>>,
}

impl<'a> WordPacker<'a> {
    pub fn new(sentence: &'a str) -> Self {
        Self {
            words: sentence.split_whitespace().peekable(),
        }
    }

    /// Pack the next chunk against `budget`, or `None` when exhausted
    pub fn next_chunk(&mut self, budget: usize) -> Option<String> {
        let mut packed = String::new();
        let mut packed_chars = 0;

        while let Some(&word) = self.words.peek() {
            let word_chars = word.chars().count();
            let needed = if packed.is_empty() {
                word_chars
            } else {
                packed_chars + 1 + word_chars
            };

            if needed <= budget {
                if !packed.is_empty() {
                    packed.push(' ');
                }
                packed.push_str(word);
                packed_chars = needed;
                self.words.next();
            } else if packed.is_empty() {
                // single word longer than the whole budget: emit it alone
                self.words.next();
                return Some(word.to_string());
            } else {
                break;
            }
        }

        if packed.is_empty() {
            None
        } else {
            Some(packed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::RuleSplitter;

    const MARCUS_QUOTE: &str = "You have power over your mind, not outside events. \
        Realize this, and you will find strength. \
        The happiness of your life depends upon your thoughts. \
        Begin at once to live.";

    fn strip_attribution<'a>(body: &'a str, author: &str) -> &'a str {
        body.strip_prefix(&format!("{}: ", author)).unwrap_or(body)
    }

    #[test]
    fn test_short_quote_is_a_single_naked_chunk() {
        let partitioner = Partitioner::default();
        let quote = "Luck is what happens when preparation meets opportunity.";
        let chunks = partitioner
            .partition("Seneca", quote, Some("quotebot"), &RuleSplitter)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].body, format!("Seneca: {}", quote));
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].total, 1);
        // single chunks are published verbatim
        assert_eq!(chunks[0].decorate(Some("quotebot")), chunks[0].body);
    }

    #[test]
    fn test_multi_sentence_quote_becomes_one_chunk_per_sentence() {
        let partitioner = Partitioner::new(POST_BUDGET, 4, 500);
        let chunks = partitioner
            .partition("Marcus Aurelius", MARCUS_QUOTE, Some("quotebot"), &RuleSplitter)
            .unwrap();

        assert_eq!(chunks.len(), 4);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.total, 4);
        }
        assert!(chunks[0].body.starts_with("Marcus Aurelius: You have power"));
        assert_eq!(chunks[3].body, "Begin at once to live.");
    }

    #[test]
    fn test_chunks_reconstruct_the_quote() {
        let partitioner = Partitioner::new(POST_BUDGET, 4, 500);
        let chunks = partitioner
            .partition("Marcus Aurelius", MARCUS_QUOTE, Some("quotebot"), &RuleSplitter)
            .unwrap();

        let rebuilt: Vec<&str> = chunks
            .iter()
            .map(|c| strip_attribution(&c.body, "Marcus Aurelius"))
            .collect();
        assert_eq!(rebuilt.join(" "), MARCUS_QUOTE);
    }

    #[test]
    fn test_decorated_chunks_respect_the_budget() {
        let partitioner = Partitioner::new(POST_BUDGET, 4, 500);
        let chunks = partitioner
            .partition("Marcus Aurelius", MARCUS_QUOTE, Some("quotebot"), &RuleSplitter)
            .unwrap();

        for chunk in &chunks {
            let decorated = chunk.decorate(Some("quotebot"));
            assert!(
                decorated.chars().count() <= POST_BUDGET,
                "chunk {} overflows: {:?}",
                chunk.index,
                decorated
            );
        }
    }

    #[test]
    fn test_overlong_sentence_is_word_packed_with_shifting_budgets() {
        // one long sentence; the first chunk's budget differs from the
        // continuations' because attribution and mention reservations differ
        let quote = vec!["veritas"; 30].join(" ");
        let partitioner = Partitioner::default();
        let chunks = partitioner
            .partition("Seneca", &quote, None, &RuleSplitter)
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].body.starts_with("Seneca: veritas"));

        let rebuilt: Vec<&str> = chunks
            .iter()
            .map(|c| strip_attribution(&c.body, "Seneca"))
            .collect();
        assert_eq!(rebuilt.join(" "), quote);

        for chunk in &chunks {
            assert!(chunk.decorate(Some("a_fifteen_chars")).chars().count() <= POST_BUDGET);
        }
    }

    #[test]
    fn test_single_overlong_word_is_emitted_untruncated() {
        let long_word = "a".repeat(40);
        let quote = format!("{} fits", long_word);
        let partitioner = Partitioner::new(30, 3, 500);
        let chunks = partitioner
            .partition("A", &quote, None, &RuleSplitter)
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].body, format!("A: {}", long_word));
        assert_eq!(chunks[1].body, "fits");
    }

    #[test]
    fn test_too_many_sentences_rejected() {
        let quote = "One one one. Two two two. Three three three. Four four four.";
        let partitioner = Partitioner::new(50, 3, 500);
        let err = partitioner
            .partition("Seneca", quote, None, &RuleSplitter)
            .unwrap_err();

        match err {
            QuotecastError::Skip(SkipError::QuoteRejected {
                author,
                sentences,
                chars,
            }) => {
                assert_eq!(author, "Seneca");
                assert_eq!(sentences, 4);
                assert_eq!(chars, quote.chars().count());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_characters_rejected() {
        let quote = "One one one. Two two two. Three three three. Four four four.";
        let partitioner = Partitioner::new(50, 10, 55);
        let err = partitioner
            .partition("Seneca", quote, None, &RuleSplitter)
            .unwrap_err();

        assert!(matches!(
            err,
            QuotecastError::Skip(SkipError::QuoteRejected { sentences: 4, .. })
        ));
    }

    #[test]
    fn test_empty_quote_is_invalid_input() {
        let partitioner = Partitioner::default();
        let err = partitioner
            .partition("Seneca", "   ", None, &RuleSplitter)
            .unwrap_err();
        assert!(matches!(err, QuotecastError::InvalidInput(_)));
    }

    #[test]
    fn test_word_packer_resumes_with_updated_budget() {
        let mut packer = WordPacker::new("alpha beta gamma delta");

        assert_eq!(packer.next_chunk(11).as_deref(), Some("alpha beta"));
        // the caller learned a tighter budget for the next chunk
        assert_eq!(packer.next_chunk(5).as_deref(), Some("gamma"));
        assert_eq!(packer.next_chunk(20).as_deref(), Some("delta"));
        assert_eq!(packer.next_chunk(20), None);
    }

    #[test]
    fn test_word_packer_exact_fit() {
        let mut packer = WordPacker::new("abcde fg");
        assert_eq!(packer.next_chunk(5).as_deref(), Some("abcde"));
        assert_eq!(packer.next_chunk(5).as_deref(), Some("fg"));
    }

    #[test]
    fn test_word_packer_overlong_word_passes_through() {
        let mut packer = WordPacker::new("abcdef gh");
        assert_eq!(packer.next_chunk(3).as_deref(), Some("abcdef"));
        assert_eq!(packer.next_chunk(3).as_deref(), Some("gh"));
        assert_eq!(packer.next_chunk(3), None);
    }
}
