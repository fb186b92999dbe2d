//! Mock publisher for testing
//!
//! Records every publish call with its reply linkage and can be scripted to
//! fail on a given call, so tests can verify both happy-path threading and
//! the committed-attempt failure semantics.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PublishError, Result};
use crate::publish::Publisher;
use crate::types::{Published, ReplyRef};

/// One recorded publish call
#[derive(Debug, Clone)]
pub struct PublishedCall {
    pub text: String,
    pub reply_to: Option<ReplyRef>,
    pub post_id: String,
}

/// Publisher that records calls instead of posting
///
/// Clones share the call log, letting tests keep a probe handle after boxing
/// the publisher into the poster.
#[derive(Clone)]
pub struct MockPublisher {
    handle: Option<String>,
    /// Fail the nth call (1-based) with this error
    fail_on_call: Option<(usize, PublishError)>,
    character_limit: Option<usize>,
    calls: Arc<Mutex<Vec<PublishedCall>>>,
}

impl MockPublisher {
    /// Publisher that always succeeds, acting as `handle`
    pub fn success(handle: &str) -> Self {
        Self {
            handle: Some(handle.to_string()),
            fail_on_call: None,
            character_limit: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Publisher whose nth call (1-based) fails with `error`
    pub fn fail_on_call(handle: &str, call: usize, error: PublishError) -> Self {
        Self {
            fail_on_call: Some((call, error)),
            ..Self::success(handle)
        }
    }

    /// Publisher with a platform character limit
    pub fn with_limit(handle: &str, limit: usize) -> Self {
        Self {
            character_limit: Some(limit),
            ..Self::success(handle)
        }
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<PublishedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, text: &str, reply_to: Option<&ReplyRef>) -> Result<Published> {
        let call_number = self.call_count() + 1;
        if let Some((failing_call, error)) = &self.fail_on_call {
            if call_number == *failing_call {
                return Err(error.clone().into());
            }
        }

        let post_id = format!("mock-{}", uuid::Uuid::new_v4());
        self.calls.lock().unwrap().push(PublishedCall {
            text: text.to_string(),
            reply_to: reply_to.cloned(),
            post_id: post_id.clone(),
        });

        Ok(Published {
            post_id,
            handle: self.handle.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn character_limit(&self) -> Option<usize> {
        self.character_limit
    }
}
