//! Publishing collaborators
//!
//! A [`Publisher`] turns a decorated chunk into a live post and reports the
//! resulting post id and acting handle, so continuation chunks can thread
//! themselves as replies. The default publisher is the dry-run one; posting
//! for real requires explicitly constructing the Mastodon publisher.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Published, ReplyRef};

pub mod dry_run;
pub mod mastodon;

// Mock publisher is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// Post publication seam
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text`, optionally as a reply to an earlier post
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::PublishError`] wrapped in
    /// [`crate::QuotecastError::Publish`]. Publish failures are terminal for
    /// the run: once a thread has started posting there is no rollback.
    async fn publish(&self, text: &str, reply_to: Option<&ReplyRef>) -> Result<Published>;

    /// Lowercase identifier for the publisher (e.g. "mastodon", "dry-run")
    fn name(&self) -> &str;

    /// The platform's per-post character limit, when it has one
    fn character_limit(&self) -> Option<usize>;
}
