//! Label propagator: move label rows into retweet-ID space, then mark and categorize the
//! matching tweets.

use crate::error::PipelineError;
use crate::model::{LabelExportRow, LabelTable, LinkedOutputRow, NormalizedTweetRow, RewrittenLabel, TweetId};
use crate::reconcile::RetweetMap;
use ahash::{AHashMap, AHashSet};

/// Outputs of the join.
#[derive(Clone, Debug, Default)]
pub struct Linked {
    pub categories: Vec<String>,
    pub tweets: Vec<LinkedOutputRow>,
    pub labels: Vec<LabelExportRow>,
}

impl Linked {
    pub fn in_scope_count(&self) -> usize {
        self.tweets.iter().filter(|t| t.in_scope).count()
    }
}

/// Translate each label ID through `map` (identity when absent). Every resulting ID must
/// name a tweet in `tweets`.
pub fn rewrite_label_ids(
    labels: &LabelTable,
    map: &RetweetMap,
    tweets: &[NormalizedTweetRow],
) -> Result<Vec<RewrittenLabel>, PipelineError> {
    let tweet_ids: AHashSet<TweetId> = tweets.iter().map(|t| t.id).collect();
    let mut out = Vec::with_capacity(labels.rows.len());
    for row in &labels.rows {
        let id = map.translate(row.id);
        if !tweet_ids.contains(&id) {
            return Err(PipelineError::UnresolvedLabel { id, original_id: row.id });
        }
        out.push(RewrittenLabel { id, original_id: row.id, handle: row.handle.clone(), flags: row.flags.clone() });
    }
    let rewritten = out.iter().filter(|l| l.id != l.original_id).count();
    tracing::debug!(labels = out.len(), rewritten, "rewrote label ids");
    Ok(out)
}

/// Mark tweets named by a label row as in scope and copy that row's flags. Out-of-scope
/// tweets get null flags. Exactly one tweet must match each label row.
pub fn propagate(
    tweets: &[NormalizedTweetRow],
    labels: &[RewrittenLabel],
    categories: usize,
) -> Result<Vec<LinkedOutputRow>, PipelineError> {
    let mut index: AHashMap<TweetId, &RewrittenLabel> = AHashMap::with_capacity(labels.len());
    for l in labels {
        index.entry(l.id).or_insert(l);
    }

    let mut in_scope = 0usize;
    let linked: Vec<LinkedOutputRow> = tweets
        .iter()
        .map(|t| match index.get(&t.id) {
            Some(l) => {
                in_scope += 1;
                LinkedOutputRow { tweet: t.clone(), in_scope: true, flags: l.flags.clone() }
            }
            None => LinkedOutputRow { tweet: t.clone(), in_scope: false, flags: vec![None; categories] },
        })
        .collect();

    if in_scope != labels.len() {
        return Err(PipelineError::LabelCountMismatch { in_scope, labels: labels.len() });
    }
    tracing::info!(tweets = linked.len(), in_scope, "propagated labels");
    Ok(linked)
}

/// Label rows enriched with the matched tweet's corporation, text, time and hashtags.
pub fn export_labels(labels: &[RewrittenLabel], tweets: &[NormalizedTweetRow]) -> Result<Vec<LabelExportRow>, PipelineError> {
    let by_id: AHashMap<TweetId, &NormalizedTweetRow> = tweets.iter().map(|t| (t.id, t)).collect();
    labels
        .iter()
        .map(|l| {
            let t = by_id
                .get(&l.id)
                .ok_or(PipelineError::UnresolvedLabel { id: l.id, original_id: l.original_id })?;
            Ok(LabelExportRow {
                id: l.id,
                original_id: l.original_id,
                corporation: t.corporation.clone(),
                handle: l.handle.clone(),
                text: t.text.clone(),
                created_at: t.created_at,
                hashtags: t.hashtags.clone(),
                flags: l.flags.clone(),
            })
        })
        .collect()
}

/// Rewrite, propagate and export in one call.
pub fn link_labels(tweets: &[NormalizedTweetRow], labels: &LabelTable, map: &RetweetMap) -> Result<Linked, PipelineError> {
    let rewritten = rewrite_label_ids(labels, map, tweets)?;
    let linked = propagate(tweets, &rewritten, labels.categories.len())?;
    let exported = export_labels(&rewritten, tweets)?;
    Ok(Linked { categories: labels.categories.clone(), tweets: linked, labels: exported })
}
