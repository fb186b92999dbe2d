//! Sentence boundary detection
//!
//! The partitioner consumes sentence splitting through the [`SentenceSplit`]
//! trait so the rule set can be swapped without touching partitioning logic.
//! [`RuleSplitter`] is the built-in implementation: a word-scanning splitter
//! that breaks after terminal punctuation and skips common abbreviation
//! false boundaries.

/// Order-preserving sentence splitting over a full text
pub trait SentenceSplit {
    /// Split `text` into sentences covering the entire input in order
    ///
    /// Joining the returned sentences with single spaces reproduces a
    /// whitespace-normalized copy of the input.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Rule-based splitter: terminal `.`, `!`, `?`, `…` followed by whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSplitter;

impl SentenceSplit for RuleSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);

            if ends_sentence(word) {
                sentences.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            sentences.push(current);
        }

        sentences
    }
}

/// Whether a word closes a sentence
fn ends_sentence(word: &str) -> bool {
    // terminal punctuation may be wrapped in closing quotes or brackets
    let inner = word.trim_end_matches(|c| matches!(c, '"' | '\'' | '\u{201d}' | '\u{2019}' | ')' | ']'));
    let Some(last) = inner.chars().last() else {
        return false;
    };

    match last {
        '!' | '?' | '\u{2026}' => true,
        '.' => !is_abbreviation(inner),
        _ => false,
    }
}

/// Abbreviations whose trailing period does not end a sentence
fn is_abbreviation(word: &str) -> bool {
    const ABBREVIATIONS: &[&str] = &[
        "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "St.", "Gen.", "Capt.", "Jr.", "Sr.", "vs.",
        "cf.", "e.g.", "i.e.",
    ];
    if ABBREVIATIONS.contains(&word) {
        return true;
    }

    // single-letter initials, as in "T. S. Eliot"
    let stem = word.trim_end_matches('.');
    let mut chars = stem.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
}
