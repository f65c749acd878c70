use crate::date::InclusionWindow;
use std::path::{Path, PathBuf};

/// Output file names, relative to `out_dir`.
pub const TRIMMED_TWEETS_FILE: &str = "tweets-trimmed.csv";
pub const LINKED_TWEETS_FILE: &str = "tweets-linked.csv";
pub const LINKED_LABELS_FILE: &str = "labels-linked.csv";

/// Columns the validator expects in the manual label table.
pub const EXPECTED_LABEL_COLUMNS: usize = 7;

/// User-facing options with defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub reference_table: PathBuf,     // Handle,Corporation
    pub archives_dir: PathBuf,        // <handle>.json files
    pub label_table: PathBuf,         // ID,Handle,<category flags>
    pub out_dir: PathBuf,
    pub media_dir: PathBuf,
    pub window: InclusionWindow,
    pub expected_label_columns: usize,
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads
    pub file_concurrency: usize,      // archives loaded / media fetched at once
    pub progress: bool,
    pub download_media: bool,
    pub write_buffer_bytes: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            reference_table: data.join("fortune-100.csv"),
            archives_dir: data.join("fortune-100-json"),
            label_table: data.join("blm-tweets-categorized.csv"),
            media_dir: data.join("media"),
            out_dir: data,
            window: InclusionWindow::default(),
            expected_label_columns: EXPECTED_LABEL_COLUMNS,
            parallelism: None,
            file_concurrency: 1,
            progress: true,
            download_media: false,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl PipelineOptions {
    pub fn with_reference_table(mut self, p: impl AsRef<Path>) -> Self {
        self.reference_table = p.as_ref().to_path_buf();
        self
    }
    pub fn with_archives_dir(mut self, p: impl AsRef<Path>) -> Self {
        self.archives_dir = p.as_ref().to_path_buf();
        self
    }
    pub fn with_label_table(mut self, p: impl AsRef<Path>) -> Self {
        self.label_table = p.as_ref().to_path_buf();
        self
    }
    pub fn with_out_dir(mut self, p: impl AsRef<Path>) -> Self {
        self.out_dir = p.as_ref().to_path_buf();
        self
    }
    pub fn with_media_dir(mut self, p: impl AsRef<Path>) -> Self {
        self.media_dir = p.as_ref().to_path_buf();
        self
    }
    pub fn with_window(mut self, window: InclusionWindow) -> Self {
        self.window = window;
        self
    }
    pub fn with_expected_label_columns(mut self, n: usize) -> Self {
        self.expected_label_columns = n;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_download_media(mut self, yes: bool) -> Self {
        self.download_media = yes;
        self
    }

    pub fn trimmed_tweets_path(&self) -> PathBuf {
        self.out_dir.join(TRIMMED_TWEETS_FILE)
    }
    pub fn linked_tweets_path(&self) -> PathBuf {
        self.out_dir.join(LINKED_TWEETS_FILE)
    }
    pub fn linked_labels_path(&self) -> PathBuf {
        self.out_dir.join(LINKED_LABELS_FILE)
    }
}
