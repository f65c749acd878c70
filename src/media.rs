//! Optional side task: fetch image attachments of in-scope tweets.

use crate::concurrency::for_each_limited;
use crate::error::PipelineError;
use crate::model::{Archive, TweetId};
use crate::progress::maybe_count_progress;
use ahash::AHashSet;
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaJob {
    pub tweet_id: TweetId,
    pub url: String,
    pub file_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaSummary {
    pub downloaded: u64,
    pub skipped_existing: u64,
}

/// Lowercased extension of the URL's last path segment; must be an image type.
pub fn media_extension(url: &str) -> Result<String, PipelineError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let ext = last.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(PipelineError::MediaExtension { url: url.to_string(), extension: ext })
    }
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("static regex"))
}

/// `<author>-<tweet id>-<index>.<ext>`, author reduced to `[A-Za-z0-9_-]`.
pub fn media_file_name(author: &str, id: TweetId, index: usize, ext: &str) -> String {
    let cleaned = unsafe_chars().replace_all(author.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    let author = if cleaned.is_empty() { "unknown" } else { cleaned };
    format!("{author}-{id}-{index}.{ext}")
}

/// Download jobs for every in-scope record carrying media. Fails on the first
/// non-image attachment.
pub fn plan_media(archives: &[Archive], in_scope: &AHashSet<TweetId>) -> Result<Vec<MediaJob>> {
    let mut jobs = Vec::new();
    for archive in archives {
        for rec in archive.records.iter().filter(|r| in_scope.contains(&r.id)) {
            let author = rec.author_name().unwrap_or(&archive.handle);
            for (i, url) in rec.media_urls().into_iter().enumerate() {
                let ext = media_extension(url)?;
                jobs.push(MediaJob {
                    tweet_id: rec.id,
                    url: url.to_string(),
                    file_name: media_file_name(author, rec.id, i, &ext),
                });
            }
        }
    }
    Ok(jobs)
}

fn fetch_to(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<()> {
    let resp = client.get(url).send().with_context(|| format!("GET {url}"))?;
    if !resp.status().is_success() {
        bail!("GET {url}: HTTP {}", resp.status());
    }
    let bytes = resp.bytes().with_context(|| format!("read body of {url}"))?;
    fs::write(dest, &bytes).with_context(|| format!("write {}", dest.display()))?;
    Ok(())
}

/// Fetch every job into `dir`, skipping files that already exist.
pub fn download_media(jobs: &[MediaJob], dir: &Path, concurrency: usize, progress: bool) -> Result<MediaSummary> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| anyhow!("http client: {e}"))?;

    let downloaded = AtomicU64::new(0);
    let skipped = AtomicU64::new(0);
    let pb = maybe_count_progress(progress, jobs.len() as u64, "Downloading media");

    for_each_limited(jobs, concurrency, |job| {
        let dest: PathBuf = dir.join(&job.file_name);
        if dest.exists() {
            skipped.fetch_add(1, Ordering::Relaxed);
        } else {
            fetch_to(&client, &job.url, &dest)?;
            downloaded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(url = %job.url, file = %job.file_name, "downloaded");
        }
        if let Some(pb) = &pb { pb.inc(1); }
        Ok(())
    })?;
    if let Some(pb) = pb { pb.finish_with_message("media done"); }

    let summary = MediaSummary { downloaded: downloaded.into_inner(), skipped_existing: skipped.into_inner() };
    tracing::info!(downloaded = summary.downloaded, skipped = summary.skipped_existing, dir = %dir.display(), "media download finished");
    Ok(summary)
}
