//! Typed failures for the linkage pipeline.
//!
//! Every variant is fatal. Stages return them through `anyhow::Result`, so callers
//! that care about the kind can `downcast_ref::<PipelineError>()`.

use crate::model::TweetId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Archive file stem has no row in the reference table.
    #[error("archive '{handle}' has no entry in the reference table")]
    MissingMapping { handle: String },

    #[error("malformed created_at timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    /// One original tweet was shared under two different retweet IDs.
    #[error("original tweet {original_id} maps to two retweets ({first} and {second})")]
    AmbiguousRetweet { original_id: TweetId, first: TweetId, second: TweetId },

    #[error(
        "found {links} retweet links but {foreign_labels} labeled rows belong to untracked handles"
    )]
    ReconciliationCountMismatch { links: usize, foreign_labels: usize },

    #[error("labeled tweet {id} (originally {original_id}) is not in the tweet table")]
    UnresolvedLabel { id: TweetId, original_id: TweetId },

    #[error("{in_scope} tweets are in scope but the label table has {labels} rows")]
    LabelCountMismatch { in_scope: usize, labels: usize },

    #[error("media url {url} has unsupported extension {extension:?}")]
    MediaExtension { url: String, extension: String },

    /// Two normalized rows share one identifier.
    #[error("tweet {id} appears more than once ({first} and {second})")]
    DuplicateTweet { id: TweetId, first: String, second: String },
}
