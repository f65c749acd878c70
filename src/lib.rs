mod config;
mod date;
mod error;
mod model;
mod paths;
mod csv_io;

mod loader;
mod filters;
mod reconcile;
mod propagate;
mod output;

mod concurrency;
mod progress;
mod util;
mod pipeline;
mod integrity;
mod media;

pub use crate::config::{PipelineOptions, EXPECTED_LABEL_COLUMNS, LINKED_LABELS_FILE, LINKED_TWEETS_FILE, TRIMMED_TWEETS_FILE};
pub use crate::date::{format_datetime, parse_created_at, parse_datetime, InclusionWindow, WINDOW_BEGIN, WINDOW_END};
pub use crate::error::PipelineError;
pub use crate::model::{
    Archive, Entity, LabelExportRow, LabelTable, LinkedOutputRow, ManualLabelRow, NormalizedTweetRow, RawRecord,
    RetweetLink, RewrittenLabel, TweetId,
};
pub use crate::pipeline::{process, Inputs, RunOutput, TweetLinkETL};

// Stage functions, usable on in-memory tables without touching the filesystem.
pub use crate::filters::{is_reply_or_mention, normalize_all, normalize_archive, normalize_record, should_include};
pub use crate::reconcile::{check_link_count, collect_retweet_links, count_foreign_labels, labeled_ids, reconcile, RetweetMap};
pub use crate::propagate::{export_labels, link_labels, propagate, rewrite_label_ids, Linked};

// Loading and writing.
pub use crate::loader::{load_archives, load_entities, load_label_table, read_archive};
pub use crate::paths::{discover_archives, ArchiveFile};
pub use crate::csv_io::{read_csv, CsvTable, CsvWriter};
pub use crate::output::{LINKED_LABEL_COLUMNS, LINKED_TWEET_COLUMNS, SCOPE_COLUMN, TRIMMED_COLUMNS};

pub use crate::integrity::{record_problems, ValidationFailure, ValidationReport};
pub use crate::media::{media_extension, media_file_name, plan_media, MediaJob, MediaSummary};

pub use crate::util::init_tracing_once;
