//! Retweet reconciler.
//!
//! The label table was collected through the web UI, which only exposes the *original*
//! tweet ID of a retweet. The archives come from the API and carry the retweet's own ID,
//! with the original embedded under `retweeted_status`. Scanning those wrappers gives an
//! original → retweet translation that lets label rows join onto the tweet table.

use crate::error::PipelineError;
use crate::model::{Archive, Entity, LabelTable, RetweetLink, TweetId};
use ahash::{AHashMap, AHashSet};
use anyhow::Result;

/// Identifiers present in the label table.
pub fn labeled_ids(labels: &LabelTable) -> AHashSet<TweetId> {
    labels.rows.iter().map(|r| r.id).collect()
}

/// One link per archive record that wraps an original whose ID is labeled.
pub fn collect_retweet_links(archives: &[Archive], labeled: &AHashSet<TweetId>) -> Vec<RetweetLink> {
    let mut links = Vec::new();
    for archive in archives {
        for rec in &archive.records {
            let Some(orig) = rec.retweeted_status.as_deref() else { continue };
            if labeled.contains(&orig.id) {
                links.push(RetweetLink {
                    entity: archive.name.clone(),
                    handle: archive.handle.clone(),
                    retweet_id: rec.id,
                    original_id: orig.id,
                });
            }
        }
    }
    tracing::debug!(links = links.len(), "collected retweet links");
    links
}

/// Translation from original-ID space to retweet-ID space. Always a function: one
/// original never maps to two retweets.
#[derive(Clone, Debug, Default)]
pub struct RetweetMap {
    map: AHashMap<TweetId, TweetId>,
}

impl RetweetMap {
    pub fn from_links(links: &[RetweetLink]) -> Result<Self, PipelineError> {
        let mut map: AHashMap<TweetId, TweetId> = AHashMap::with_capacity(links.len());
        for link in links {
            match map.get(&link.original_id) {
                Some(&prev) if prev != link.retweet_id => {
                    return Err(PipelineError::AmbiguousRetweet {
                        original_id: link.original_id,
                        first: prev,
                        second: link.retweet_id,
                    });
                }
                Some(_) => {}
                None => {
                    map.insert(link.original_id, link.retweet_id);
                }
            }
        }
        Ok(Self { map })
    }

    #[inline]
    pub fn get(&self, original: TweetId) -> Option<TweetId> {
        self.map.get(&original).copied()
    }

    /// `get` with identity fallback.
    #[inline]
    pub fn translate(&self, id: TweetId) -> TweetId {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Label rows whose handle is not a tracked entity: these are exactly the rows that must
/// be reached through a retweet.
pub fn count_foreign_labels(labels: &LabelTable, entities: &[Entity]) -> usize {
    let tracked: AHashSet<&str> = entities.iter().map(|e| e.handle.as_str()).collect();
    labels.rows.iter().filter(|r| !tracked.contains(r.handle.as_str())).count()
}

/// Both sides must agree on how many retweets there are.
pub fn check_link_count(links: &[RetweetLink], labels: &LabelTable, entities: &[Entity]) -> Result<(), PipelineError> {
    let foreign_labels = count_foreign_labels(labels, entities);
    if links.len() != foreign_labels {
        return Err(PipelineError::ReconciliationCountMismatch { links: links.len(), foreign_labels });
    }
    Ok(())
}

/// Scan, build the translation, then count-check. Collisions are reported before
/// count mismatches.
pub fn reconcile(archives: &[Archive], labels: &LabelTable, entities: &[Entity]) -> Result<RetweetMap> {
    let labeled = labeled_ids(labels);
    let links = collect_retweet_links(archives, &labeled);
    let map = RetweetMap::from_links(&links)?;
    check_link_count(&links, labels, entities)?;
    tracing::info!(links = links.len(), translations = map.len(), "reconciled retweets");
    Ok(map)
}
