//! Progress reporting: count-style bars over archives and downloads.

use indicatif::{ProgressBar, ProgressStyle};

/// Count-style progress bar (items processed out of total), with an optional label.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  elapsed: {elapsed_precise}",
    ) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// `Some(bar)` when progress is enabled.
pub fn maybe_count_progress(enabled: bool, total: u64, label: &str) -> Option<ProgressBar> {
    if enabled { Some(make_count_progress(total, label)) } else { None }
}
