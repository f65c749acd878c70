//! Output tables. Column names and order are what downstream notebooks read.

use crate::csv_io::CsvWriter;
use crate::date::format_datetime;
use crate::loader::format_flag;
use crate::model::{LabelExportRow, LinkedOutputRow, NormalizedTweetRow};
use anyhow::Result;
use std::path::Path;

pub const TRIMMED_COLUMNS: [&str; 5] = ["Datetime", "ID", "Text", "Hashtags", "Corporation"];
pub const LINKED_TWEET_COLUMNS: [&str; 6] = ["ID", "Corporation", "Text", "Datetime", "Racial Justice", "Hashtags"];
pub const LINKED_LABEL_COLUMNS: [&str; 7] = ["ID", "Original ID", "Corporation", "Handle", "Text", "Datetime", "Hashtags"];

/// Scope flag column name in the linked tweet table.
pub const SCOPE_COLUMN: &str = "Racial Justice";

pub fn write_trimmed(path: &Path, rows: &[NormalizedTweetRow], buf: usize) -> Result<u64> {
    let mut w = CsvWriter::create(path, buf)?;
    w.write_record(TRIMMED_COLUMNS)?;
    for r in rows {
        w.write_record([
            format_datetime(r.created_at),
            r.id.to_string(),
            r.text.clone(),
            r.hashtags.clone(),
            r.corporation.clone(),
        ])?;
    }
    w.finish()
}

pub fn write_linked_tweets(path: &Path, rows: &[LinkedOutputRow], categories: &[String], buf: usize) -> Result<u64> {
    let mut w = CsvWriter::create(path, buf)?;
    w.write_record(LINKED_TWEET_COLUMNS.iter().copied().chain(categories.iter().map(|c| c.as_str())))?;
    for r in rows {
        let t = &r.tweet;
        let mut rec = vec![
            t.id.to_string(),
            t.corporation.clone(),
            t.text.clone(),
            format_datetime(t.created_at),
            format_flag(Some(r.in_scope)).to_string(),
            t.hashtags.clone(),
        ];
        rec.extend(r.flags.iter().map(|f| format_flag(*f).to_string()));
        w.write_record(rec)?;
    }
    w.finish()
}

pub fn write_linked_labels(path: &Path, rows: &[LabelExportRow], categories: &[String], buf: usize) -> Result<u64> {
    let mut w = CsvWriter::create(path, buf)?;
    w.write_record(LINKED_LABEL_COLUMNS.iter().copied().chain(categories.iter().map(|c| c.as_str())))?;
    for r in rows {
        let mut rec = vec![
            r.id.to_string(),
            r.original_id.to_string(),
            r.corporation.clone(),
            r.handle.clone(),
            r.text.clone(),
            format_datetime(r.created_at),
            r.hashtags.clone(),
        ];
        rec.extend(r.flags.iter().map(|f| format_flag(*f).to_string()));
        w.write_record(rec)?;
    }
    w.finish()
}
