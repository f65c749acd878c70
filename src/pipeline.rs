use crate::config::PipelineOptions;
use crate::date::InclusionWindow;
use crate::filters::normalize_all;
use crate::loader::{load_archives, load_entities, load_label_table};
use crate::media::{download_media, plan_media, MediaSummary};
use crate::model::{Archive, Entity, LabelTable, NormalizedTweetRow, TweetId};
use crate::output::{write_linked_labels, write_linked_tweets, write_trimmed};
use crate::propagate::{link_labels, Linked};
use crate::reconcile::reconcile;
use crate::util::{configure_parallelism, init_tracing_once};
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct TweetLinkETL {
    pub(crate) opts: PipelineOptions,
}

/// Everything the pipeline reads.
#[derive(Clone, Debug)]
pub struct Inputs {
    pub entities: Vec<Entity>,
    pub archives: Vec<Archive>,
    pub labels: LabelTable,
}

/// In-memory results of a run, plus where they were written.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub tweets: Vec<NormalizedTweetRow>,
    pub linked: Linked,
    pub written: Vec<PathBuf>,
    pub media: Option<MediaSummary>,
}

impl Default for TweetLinkETL {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetLinkETL {
    pub fn new() -> Self {
        Self { opts: PipelineOptions::default() }
    }

    pub fn from_options(opts: PipelineOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn reference_table(mut self, p: impl AsRef<Path>) -> Self { self.opts = self.opts.with_reference_table(p); self }
    pub fn archives_dir(mut self, p: impl AsRef<Path>) -> Self { self.opts = self.opts.with_archives_dir(p); self }
    pub fn label_table(mut self, p: impl AsRef<Path>) -> Self { self.opts = self.opts.with_label_table(p); self }
    pub fn out_dir(mut self, p: impl AsRef<Path>) -> Self { self.opts = self.opts.with_out_dir(p); self }
    pub fn media_dir(mut self, p: impl AsRef<Path>) -> Self { self.opts = self.opts.with_media_dir(p); self }
    pub fn window(mut self, window: InclusionWindow) -> Self { self.opts = self.opts.with_window(window); self }
    pub fn expected_label_columns(mut self, n: usize) -> Self { self.opts = self.opts.with_expected_label_columns(n); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn download_media(mut self, yes: bool) -> Self { self.opts = self.opts.with_download_media(yes); self }

    /// Read the reference table, archives and label table.
    pub fn load(&self) -> Result<Inputs> {
        let entities = load_entities(&self.opts.reference_table)
            .with_context(|| format!("loading reference table {}", self.opts.reference_table.display()))?;
        let archives = load_archives(&self.opts.archives_dir, &entities, self.opts.file_concurrency, self.opts.progress)
            .with_context(|| format!("loading archives from {}", self.opts.archives_dir.display()))?;
        let labels = load_label_table(&self.opts.label_table)
            .with_context(|| format!("loading label table {}", self.opts.label_table.display()))?;
        Ok(Inputs { entities, archives, labels })
    }

    /// Full run: load, normalize, reconcile, propagate, write the three tables and, when
    /// enabled, fetch media for in-scope tweets.
    pub fn run(self) -> Result<RunOutput> {
        init_tracing_once();
        configure_parallelism(self.opts.parallelism);

        let inputs = self.load()?;
        let (tweets, linked) = process(&inputs, self.opts.window)?;

        let buf = self.opts.write_buffer_bytes;
        let trimmed = self.opts.trimmed_tweets_path();
        let linked_tweets = self.opts.linked_tweets_path();
        let linked_labels = self.opts.linked_labels_path();
        write_trimmed(&trimmed, &tweets, buf)?;
        write_linked_tweets(&linked_tweets, &linked.tweets, &linked.categories, buf)?;
        write_linked_labels(&linked_labels, &linked.labels, &linked.categories, buf)?;
        tracing::info!(out_dir = %self.opts.out_dir.display(), "wrote output tables");

        let media = if self.opts.download_media {
            let in_scope: AHashSet<TweetId> = linked.tweets.iter().filter(|t| t.in_scope).map(|t| t.tweet.id).collect();
            let jobs = plan_media(&inputs.archives, &in_scope)?;
            tracing::info!(files = jobs.len(), "planned media downloads");
            Some(download_media(&jobs, &self.opts.media_dir, self.opts.file_concurrency, self.opts.progress)?)
        } else {
            None
        };

        Ok(RunOutput { tweets, linked, written: vec![trimmed, linked_tweets, linked_labels], media })
    }
}

/// The pure part of a run: normalize, reconcile, propagate. No files are touched.
pub fn process(inputs: &Inputs, window: InclusionWindow) -> Result<(Vec<NormalizedTweetRow>, Linked)> {
    let tweets = normalize_all(&inputs.archives, window)?;
    let map = reconcile(&inputs.archives, &inputs.labels, &inputs.entities)?;
    let linked = link_labels(&tweets, &inputs.labels, &map)?;
    Ok((tweets, linked))
}
