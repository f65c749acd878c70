//! Validation entry point: re-load the written tables and the archives and re-check the
//! invariants the pipeline relies on. Unreadable inputs are errors; broken invariants are
//! collected into a report so one pass shows everything that is wrong.

use crate::concurrency::map_limited;
use crate::csv_io::{read_csv, CsvTable};
use crate::date::{parse_datetime, InclusionWindow};
use crate::loader::{parse_flag, read_archive};
use crate::model::{RawRecord, TweetId};
use crate::output::{SCOPE_COLUMN, TRIMMED_COLUMNS};
use crate::paths::discover_archives;
use crate::pipeline::TweetLinkETL;
use crate::progress::maybe_count_progress;
use crate::util::init_tracing_once;
use ahash::AHashSet;
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationFailure {
    pub source: PathBuf,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
    pub archives_checked: usize,
    pub records_checked: usize,
    pub tweets_checked: usize,
    pub labels_checked: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, source: &Path, message: impl Into<String>) {
        self.failures.push(ValidationFailure { source: source.to_path_buf(), message: message.into() });
    }
}

/// Archive-integrity problems of one record and its embedded original.
pub fn record_problems(rec: &RawRecord) -> Vec<String> {
    let mut out = Vec::new();
    if rec.truncated {
        out.push(format!("tweet {} is truncated", rec.id));
    }
    if rec.id_str != rec.id.to_string() {
        out.push(format!("tweet {} has id_str {:?}", rec.id, rec.id_str));
    }
    if let Some(orig) = rec.retweeted_status.as_deref() {
        for p in record_problems(orig) {
            out.push(format!("retweet {}: {}", rec.id, p));
        }
    }
    out
}

/// Linked-tweet table checks. Returns the ID set and the in-scope count for the label
/// table checks.
fn check_linked_tweets(report: &mut ValidationReport, table: &CsvTable, window: &InclusionWindow) -> Result<(AHashSet<TweetId>, usize)> {
    let id_idx = table.require_column("ID")?;
    let dt_idx = table.require_column("Datetime")?;
    let scope_idx = table.require_column(SCOPE_COLUMN)?;

    let mut ids = AHashSet::with_capacity(table.rows.len());
    let mut in_scope = 0usize;
    for (n, row) in table.rows.iter().enumerate() {
        let line = n + 2;
        let raw_id = table.cell(row, id_idx);
        let id: TweetId = match raw_id.parse() {
            Ok(id) => id,
            Err(_) => {
                report.fail(&table.path, format!("row {line}: bad ID {raw_id:?}"));
                continue;
            }
        };
        if !ids.insert(id) {
            report.fail(&table.path, format!("row {line}: duplicate ID {id}"));
        }

        let scope = match parse_flag(table.cell(row, scope_idx)) {
            Some(v) => v,
            None => {
                report.fail(&table.path, format!("row {line}: bad {SCOPE_COLUMN} value {:?}", table.cell(row, scope_idx)));
                None
            }
        };
        if scope == Some(true) {
            in_scope += 1;
        }

        match parse_datetime(table.cell(row, dt_idx)) {
            Ok(t) if t < window.begin && scope.is_some() => {
                report.fail(&table.path, format!("row {line}: tweet {id} predates categorization but has a {SCOPE_COLUMN} value"));
            }
            Ok(t) if !window.contains(t) => {
                report.fail(&table.path, format!("row {line}: tweet {id} is outside the inclusion window {window}"));
            }
            Ok(_) => {}
            Err(e) => report.fail(&table.path, format!("row {line}: {e}")),
        }
    }
    report.tweets_checked = table.rows.len();
    Ok((ids, in_scope))
}

fn check_linked_labels(report: &mut ValidationReport, table: &CsvTable, tweet_ids: &AHashSet<TweetId>, in_scope: usize) -> Result<()> {
    let id_idx = table.require_column("ID")?;
    for (n, row) in table.rows.iter().enumerate() {
        let raw_id = table.cell(row, id_idx);
        match raw_id.parse::<TweetId>() {
            Ok(id) if !tweet_ids.contains(&id) => {
                report.fail(&table.path, format!("row {}: labeled tweet {id} is missing from the tweet table", n + 2));
            }
            Ok(_) => {}
            Err(_) => report.fail(&table.path, format!("row {}: bad ID {raw_id:?}", n + 2)),
        }
    }
    if table.rows.len() != in_scope {
        report.fail(
            &table.path,
            format!("{} labeled rows but {in_scope} tweets marked {SCOPE_COLUMN}", table.rows.len()),
        );
    }
    report.labels_checked = table.rows.len();
    Ok(())
}

/// Intermediate table: fixed column contract, unique IDs, and exactly the tweets of the
/// linked table.
fn check_trimmed_tweets(report: &mut ValidationReport, table: &CsvTable, linked_ids: &AHashSet<TweetId>) -> Result<()> {
    if table.header != TRIMMED_COLUMNS {
        report.fail(&table.path, format!("expected columns {TRIMMED_COLUMNS:?}, found {:?}", table.header));
    }
    let id_idx = table.require_column("ID")?;
    let mut ids = AHashSet::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let raw_id = table.cell(row, id_idx);
        match raw_id.parse::<TweetId>() {
            Ok(id) => {
                if !ids.insert(id) {
                    report.fail(&table.path, format!("row {}: duplicate ID {id}", n + 2));
                } else if !linked_ids.contains(&id) {
                    report.fail(&table.path, format!("row {}: tweet {id} is missing from the linked table", n + 2));
                }
            }
            Err(_) => report.fail(&table.path, format!("row {}: bad ID {raw_id:?}", n + 2)),
        }
    }
    if ids.len() != linked_ids.len() {
        report.fail(&table.path, format!("{} trimmed tweets but {} linked tweets", ids.len(), linked_ids.len()));
    }
    Ok(())
}

impl TweetLinkETL {
    /// Re-check written outputs, the input label table shape, and every archive.
    pub fn validate(self) -> Result<ValidationReport> {
        init_tracing_once();
        let opts = &self.opts;
        let mut report = ValidationReport::default();

        let tweets = read_csv(&opts.linked_tweets_path())?;
        let labels = read_csv(&opts.linked_labels_path())?;
        let (ids, in_scope) = check_linked_tweets(&mut report, &tweets, &opts.window)?;
        check_linked_labels(&mut report, &labels, &ids, in_scope)?;
        let trimmed = read_csv(&opts.trimmed_tweets_path())?;
        check_trimmed_tweets(&mut report, &trimmed, &ids)?;

        let label_input = read_csv(&opts.label_table)?;
        if label_input.header.len() != opts.expected_label_columns {
            report.fail(
                &opts.label_table,
                format!("expected {} columns, found {}: {:?}", opts.expected_label_columns, label_input.header.len(), label_input.header),
            );
        }

        let files = discover_archives(&opts.archives_dir)?;
        let pb = maybe_count_progress(opts.progress, files.len() as u64, "Validating archives");
        let per_file = map_limited(&files, opts.file_concurrency, |f| {
            let records = read_archive(&f.path)?;
            let problems: Vec<String> = records.iter().flat_map(record_problems).collect();
            if let Some(pb) = &pb { pb.inc(1); }
            Ok((f.path.clone(), records.len(), problems))
        })?;
        if let Some(pb) = pb { pb.finish_with_message("done"); }

        report.archives_checked = per_file.len();
        for (path, n, problems) in per_file {
            report.records_checked += n;
            for p in problems {
                report.fail(&path, p);
            }
        }

        if report.is_ok() {
            tracing::info!(archives = report.archives_checked, tweets = report.tweets_checked, labels = report.labels_checked, "validation passed");
        } else {
            for f in &report.failures {
                tracing::error!(source = %f.source.display(), "{}", f.message);
            }
        }
        Ok(report)
    }
}
