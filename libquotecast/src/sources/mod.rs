//! Quote lookup sources
//!
//! A [`QuoteSource`] resolves an author name to that author's candidate
//! quotes. Lookup failures are selection-stage skips: the orchestrator
//! abandons the attempt for that author and re-draws, without touching any
//! persisted state.

use async_trait::async_trait;

use crate::error::Result;

pub mod wikiquote;

// Mock source is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// Author-to-quotes lookup
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the candidate quotes attributed to `author`
    ///
    /// # Errors
    ///
    /// Returns [`crate::SkipError::AuthorNotFound`] when the source knows no
    /// such author, [`crate::SkipError::AuthorAmbiguous`] when the name maps
    /// to several distinct entities, and
    /// [`crate::SkipError::SourceUnavailable`] on transport failures. All
    /// three are recoverable skips.
    async fn lookup(&self, author: &str) -> Result<Vec<String>>;

    /// Lowercase identifier for the source (e.g. "wikiquote")
    fn name(&self) -> &str;
}
