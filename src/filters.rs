//! Tweet filter and normalizer: which archive records become tweet rows, and how.

use crate::date::{parse_created_at, InclusionWindow};
use crate::error::PipelineError;
use crate::model::{Archive, NormalizedTweetRow, RawRecord, TweetId};
use ahash::AHashMap;
use anyhow::{anyhow, Result};

/// Replies and @-mentions are conversations, not announcements.
#[inline]
pub fn is_reply_or_mention(rec: &RawRecord) -> bool {
    rec.in_reply_to_user_id.is_some() || rec.full_text.starts_with('@')
}

/// Keep a record iff it is not a reply, not a mention, and was created inside `window`.
/// The timestamp is only parsed for records that pass the first two checks.
pub fn should_include(rec: &RawRecord, window: &InclusionWindow) -> Result<bool, PipelineError> {
    if is_reply_or_mention(rec) {
        return Ok(false);
    }
    let t = parse_created_at(&rec.created_at)?;
    Ok(window.contains(t))
}

/// Project a record into a tweet row.
pub fn normalize_record(rec: &RawRecord, corporation: &str) -> Result<NormalizedTweetRow, PipelineError> {
    Ok(NormalizedTweetRow {
        id: rec.id,
        created_at: parse_created_at(&rec.created_at)?,
        corporation: corporation.to_string(),
        text: rec.full_text.replace('\r', " "),
        hashtags: rec.hashtags_joined(),
    })
}

/// Lazy single pass over one entity's records.
pub fn normalize_archive<'a>(
    records: &'a [RawRecord],
    corporation: &'a str,
    window: InclusionWindow,
) -> impl Iterator<Item = Result<NormalizedTweetRow, PipelineError>> + 'a {
    records.iter().filter_map(move |rec| match should_include(rec, &window) {
        Ok(true) => Some(normalize_record(rec, corporation)),
        Ok(false) => None,
        Err(e) => Some(Err(e)),
    })
}

/// Normalize every archive into one table. Rows keep archive order; an identifier seen
/// twice fails the run.
pub fn normalize_all(archives: &[Archive], window: InclusionWindow) -> Result<Vec<NormalizedTweetRow>> {
    let mut rows: Vec<NormalizedTweetRow> = Vec::new();
    let mut seen: AHashMap<TweetId, String> = AHashMap::new();

    for archive in archives {
        let before = rows.len();
        for row in normalize_archive(&archive.records, &archive.name, window) {
            let row = row.map_err(|e| anyhow::Error::new(e).context(format!("archive {}", archive.handle)))?;
            if let Some(first) = seen.insert(row.id, archive.handle.clone()) {
                return Err(anyhow!(PipelineError::DuplicateTweet {
                    id: row.id,
                    first,
                    second: archive.handle.clone(),
                }));
            }
            rows.push(row);
        }
        let kept = rows.len() - before;
        tracing::debug!(handle = %archive.handle, kept, dropped = archive.records.len() - kept, "normalized archive");
    }
    tracing::info!(rows = rows.len(), window = %window, "normalized tweet table");
    Ok(rows)
}
