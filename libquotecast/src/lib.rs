//! Quotecast - post weighted-sampled quotes to the Fediverse
//!
//! This library selects a quote attributed to a sampled author, splits it
//! into post-sized chunks, and publishes the chunks as a reply thread,
//! penalizing authors and quotes that have been posted before.

pub mod chunker;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod poster;
pub mod publish;
pub mod segment;
pub mod sources;
pub mod types;
pub mod weights;

// Re-export commonly used types
pub use config::{Config, Overrides, Settings};
pub use error::{QuotecastError, Result, SkipError};
pub use history::HistoryStore;
pub use poster::QuotePoster;
pub use types::{Chunk, PostReceipt, Published, ReplyRef};
