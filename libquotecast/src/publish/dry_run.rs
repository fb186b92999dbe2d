//! Dry-run publisher
//!
//! Prints each would-be post to stdout and fabricates sequential post ids so
//! reply threading still exercises the real code path. This is the default
//! publisher: nothing goes live unless the caller explicitly opts in to the
//! Mastodon publisher.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::error::Result;
use crate::publish::Publisher;
use crate::types::{Published, ReplyRef};

/// Publisher that prints posts instead of sending them
pub struct DryRunPublisher {
    handle: Option<String>,
    counter: AtomicU64,
}

impl DryRunPublisher {
    /// `handle` is echoed back as the acting account, mirroring what a live
    /// publisher would report after authenticating
    pub fn new(handle: Option<String>) -> Self {
        Self {
            handle,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, text: &str, reply_to: Option<&ReplyRef>) -> Result<Published> {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let post_id = format!("dry-{}", sequence);

        match reply_to {
            Some(reply) => info!(post_id = %post_id, in_reply_to = %reply.post_id, "dry run post"),
            None => info!(post_id = %post_id, "dry run post"),
        }
        println!("{}", text);

        Ok(Published {
            post_id,
            handle: self.handle.clone(),
        })
    }

    fn name(&self) -> &str {
        "dry-run"
    }

    fn character_limit(&self) -> Option<usize> {
        None
    }
}
