//! Core types for Quotecast

use serde::{Deserialize, Serialize};

/// Reference to an already-published post, used to thread continuations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyRef {
    /// Platform-specific id of the post being replied to
    pub post_id: String,
    /// Handle of the account that owns that post, when known
    pub handle: Option<String>,
}

/// Result of publishing a single post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Published {
    pub post_id: String,
    pub handle: Option<String>,
}

impl Published {
    /// View this post as a reply target for the next chunk in a thread
    pub fn as_reply_ref(&self) -> ReplyRef {
        ReplyRef {
            post_id: self.post_id.clone(),
            handle: self.handle.clone(),
        }
    }
}

/// One post-sized piece of a partitioned quote
///
/// `body` is the undecorated text: the attribution-prefixed first piece for
/// index 0, a bare quote fragment otherwise. Numbering and reply-mention
/// decorations are applied by [`Chunk::decorate`] just before publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub body: String,
    /// Position within the partition, `0..total`
    pub index: usize,
    /// Total number of chunks in the partition
    pub total: usize,
}

impl Chunk {
    /// Render the chunk as it is handed to the publisher
    ///
    /// Single-chunk partitions are published verbatim. Multi-chunk partitions
    /// get a 1-based ` (i/N)` suffix on every chunk, and continuation chunks
    /// additionally get an `@handle ` mention prefix when the reply handle is
    /// known.
    pub fn decorate(&self, reply_handle: Option<&str>) -> String {
        if self.total == 1 {
            return self.body.clone();
        }

        let numbered = format!("{} ({}/{})", self.body, self.index + 1, self.total);
        match reply_handle {
            Some(handle) if self.index > 0 => format!("@{} {}", handle, numbered),
            _ => numbered,
        }
    }
}

/// Summary of one successful run: the posted quote and its post ids in order
#[derive(Debug, Clone, Serialize)]
pub struct PostReceipt {
    pub author: String,
    pub quote: String,
    pub quote_hash: String,
    pub post_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_published_verbatim() {
        let chunk = Chunk {
            body: "Seneca: Luck is what happens when preparation meets opportunity.".to_string(),
            index: 0,
            total: 1,
        };
        assert_eq!(chunk.decorate(Some("quotebot")), chunk.body);
        assert_eq!(chunk.decorate(None), chunk.body);
    }

    #[test]
    fn test_first_chunk_gets_suffix_but_no_mention() {
        let chunk = Chunk {
            body: "Seneca: First part.".to_string(),
            index: 0,
            total: 3,
        };
        assert_eq!(
            chunk.decorate(Some("quotebot")),
            "Seneca: First part. (1/3)"
        );
    }

    #[test]
    fn test_continuation_chunk_gets_mention_and_suffix() {
        let chunk = Chunk {
            body: "second part.".to_string(),
            index: 1,
            total: 3,
        };
        assert_eq!(
            chunk.decorate(Some("quotebot")),
            "@quotebot second part. (2/3)"
        );
    }

    #[test]
    fn test_continuation_chunk_without_handle() {
        let chunk = Chunk {
            body: "second part.".to_string(),
            index: 1,
            total: 2,
        };
        assert_eq!(chunk.decorate(None), "second part. (2/2)");
    }

    #[test]
    fn test_published_as_reply_ref() {
        let published = Published {
            post_id: "109432".to_string(),
            handle: Some("quotebot".to_string()),
        };
        let reply = published.as_reply_ref();
        assert_eq!(reply.post_id, "109432");
        assert_eq!(reply.handle.as_deref(), Some("quotebot"));
    }
}
