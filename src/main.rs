use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tweetlink::{init_tracing_once, PipelineOptions, TweetLinkETL};

/// Link corporate tweet archives with the manually categorized movement-tweet table.
#[derive(Parser, Debug)]
#[command(name = "tweetlink")]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize archives, reconcile retweets, propagate labels and write the output tables.
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// Also fetch image attachments of in-scope tweets into --media-dir.
        #[arg(long)]
        download_media: bool,
    },
    /// Re-load the output tables and archives and re-check their invariants.
    Validate {
        #[command(flatten)]
        paths: PathArgs,
    },
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Reference table with Handle,Corporation columns.
    #[arg(long, env = "TWEETLINK_REFERENCE", default_value = "data/fortune-100.csv")]
    reference: PathBuf,

    /// Directory of <handle>.json archives.
    #[arg(long, env = "TWEETLINK_ARCHIVES", default_value = "data/fortune-100-json")]
    archives: PathBuf,

    /// Manually categorized label table.
    #[arg(long, env = "TWEETLINK_LABELS", default_value = "data/blm-tweets-categorized.csv")]
    labels: PathBuf,

    /// Directory the output tables are written to.
    #[arg(long, env = "TWEETLINK_OUT_DIR", default_value = "data")]
    out_dir: PathBuf,

    /// Directory for downloaded media.
    #[arg(long, env = "TWEETLINK_MEDIA_DIR", default_value = "data/media")]
    media_dir: PathBuf,

    /// Archives (or downloads) processed at once.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Hide progress bars.
    #[arg(long)]
    no_progress: bool,
}

impl PathArgs {
    fn options(&self) -> PipelineOptions {
        PipelineOptions::default()
            .with_reference_table(&self.reference)
            .with_archives_dir(&self.archives)
            .with_label_table(&self.labels)
            .with_out_dir(&self.out_dir)
            .with_media_dir(&self.media_dir)
            .with_file_concurrency(self.concurrency)
            .with_progress(!self.no_progress)
    }
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { paths, download_media } => {
            let out = TweetLinkETL::from_options(paths.options()).download_media(download_media).run()?;
            println!(
                "{} tweets, {} in scope, {} labeled rows",
                out.tweets.len(),
                out.linked.in_scope_count(),
                out.linked.labels.len()
            );
            for p in &out.written {
                println!("wrote {}", p.display());
            }
            if let Some(m) = out.media {
                println!("media: {} downloaded, {} already present", m.downloaded, m.skipped_existing);
            }
        }
        Command::Validate { paths } => {
            let report = TweetLinkETL::from_options(paths.options()).validate()?;
            if !report.is_ok() {
                for f in &report.failures {
                    eprintln!("{}: {}", f.source.display(), f.message);
                }
                bail!("validation failed with {} problem(s)", report.failures.len());
            }
            println!(
                "ok: {} archives ({} records), {} tweets, {} labeled rows",
                report.archives_checked, report.records_checked, report.tweets_checked, report.labels_checked
            );
        }
    }
    Ok(())
}
