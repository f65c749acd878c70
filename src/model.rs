//! Record shapes shared by every stage: raw archive records, the normalized tweet row,
//! manual label rows, and the linked outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Tweet identifier. Archive IDs exceed 2^53, so they are held as exact `u64`
/// and never pass through a float.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(pub u64);

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TweetId {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TweetId)
    }
}

impl From<u64> for TweetId {
    fn from(v: u64) -> Self {
        TweetId(v)
    }
}

/// A tracked organization from the reference table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub handle: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Hashtag {
    pub text: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Media {
    pub media_url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
}

/// One archived post. Unknown fields are ignored by serde.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRecord {
    pub created_at: String,
    pub id: TweetId,
    #[serde(default)]
    pub id_str: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub in_reply_to_user_id: Option<u64>,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub extended_entities: Option<Entities>,
    #[serde(default)]
    pub retweeted_status: Option<Box<RawRecord>>,
    #[serde(default)]
    pub user: Option<User>,
}

impl RawRecord {
    /// Hashtag texts joined with `;`.
    pub fn hashtags_joined(&self) -> String {
        self.entities
            .hashtags
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Media URLs: extended entities win over plain entities; a retweet with no
    /// media of its own falls back to the embedded original.
    pub fn media_urls(&self) -> Vec<&str> {
        let own = match &self.extended_entities {
            Some(ext) if !ext.media.is_empty() => &ext.media,
            _ => &self.entities.media,
        };
        if own.is_empty() {
            if let Some(orig) = &self.retweeted_status {
                return orig.media_urls();
            }
        }
        own.iter().map(|m| m.media_url.as_str()).collect()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str()).filter(|s| !s.trim().is_empty())
    }
}

/// An entity's archive after loading.
#[derive(Clone, Debug)]
pub struct Archive {
    pub handle: String,
    pub name: String,
    pub records: Vec<RawRecord>,
}

/// Canonical per-tweet row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedTweetRow {
    pub id: TweetId,
    pub created_at: OffsetDateTime,
    pub corporation: String,
    pub text: String,
    pub hashtags: String,
}

/// Observed retweet wrapper whose original is in the label table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetweetLink {
    pub entity: String,
    pub handle: String,
    pub retweet_id: TweetId,
    pub original_id: TweetId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManualLabelRow {
    pub id: TweetId,
    pub handle: String,
    pub flags: Vec<Option<bool>>,
}

/// Manually categorized table. `categories[i]` names `row.flags[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    pub categories: Vec<String>,
    pub rows: Vec<ManualLabelRow>,
}

impl LabelTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Label row after its identifier was moved into retweet-ID space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewrittenLabel {
    pub id: TweetId,
    pub original_id: TweetId,
    pub handle: String,
    pub flags: Vec<Option<bool>>,
}

/// Tweet row with the propagated scope flag and categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedOutputRow {
    pub tweet: NormalizedTweetRow,
    pub in_scope: bool,
    pub flags: Vec<Option<bool>>,
}

/// Label row enriched with the matched tweet's fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelExportRow {
    pub id: TweetId,
    pub original_id: TweetId,
    pub corporation: String,
    pub handle: String,
    pub text: String,
    pub created_at: OffsetDateTime,
    pub hashtags: String,
    pub flags: Vec<Option<bool>>,
}
