#[path = "common/mod.rs"]
mod common;

use common::*;
use time::macros::datetime;
use tweetlink::{
    normalize_all, normalize_archive, should_include, InclusionWindow, PipelineError, TweetId, WINDOW_BEGIN,
};

/// One qualifying tweet and one reply in Acme's archive: only the qualifying one survives.
#[test]
fn reply_is_dropped_and_qualifying_tweet_kept() {
    let acme = archive(
        "Acme",
        "Acme",
        vec![
            tweet(100, "Mon Jun 01 15:00:00 +0000 2020", "Announcing our pledge", &[]),
            reply(101, "Mon Jun 01 16:00:00 +0000 2020", "Thanks!"),
        ],
    );
    let rows: Vec<_> = normalize_archive(&acme.records, &acme.name, InclusionWindow::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, TweetId(100));
    assert_eq!(rows[0].corporation, "Acme");
    assert_eq!(rows[0].created_at, datetime!(2020-06-01 15:00 UTC));
}

/// Replaying the predicate on the same record gives the same answer.
#[test]
fn should_include_is_deterministic() {
    let w = InclusionWindow::default();
    let recs = archive(
        "Acme",
        "Acme",
        vec![
            tweet(1, "Mon Jun 01 15:00:00 +0000 2020", "keep", &[]),
            tweet(2, "Mon Jun 01 15:00:00 +0000 2020", "@drop", &[]),
            reply(3, "Mon Jun 01 15:00:00 +0000 2020", "drop"),
            tweet(4, "Wed May 20 09:00:00 +0000 2020", "too early", &[]),
        ],
    )
    .records;
    let first: Vec<bool> = recs.iter().map(|r| should_include(r, &w).unwrap()).collect();
    for _ in 0..3 {
        let again: Vec<bool> = recs.iter().map(|r| should_include(r, &w).unwrap()).collect();
        assert_eq!(first, again);
    }
    assert_eq!(first, vec![true, false, false, false]);
}

#[test]
fn window_start_is_inclusive_and_end_exclusive() {
    let w = InclusionWindow::default();
    let at_begin = record(tweet(1, "Mon May 25 00:00:00 +0000 2020", "first", &[]));
    let before = record(tweet(2, "Sun May 24 23:59:59 +0000 2020", "early", &[]));
    let last = record(tweet(3, "Sat Jul 25 23:59:59 +0000 2020", "last", &[]));
    let at_end = record(tweet(4, "Sun Jul 26 00:00:00 +0000 2020", "late", &[]));
    assert!(should_include(&at_begin, &w).unwrap());
    assert!(!should_include(&before, &w).unwrap());
    assert!(should_include(&last, &w).unwrap());
    assert!(!should_include(&at_end, &w).unwrap());
}

#[test]
fn custom_window_is_honored() {
    let w = InclusionWindow::new(WINDOW_BEGIN, datetime!(2020-06-01 0:00 UTC));
    let june = record(tweet(1, "Mon Jun 01 15:00:00 +0000 2020", "june", &[]));
    assert!(!should_include(&june, &w).unwrap());
}

#[test]
fn malformed_timestamp_is_fatal_for_candidates_only() {
    let w = InclusionWindow::default();
    // Replies are rejected before the timestamp is looked at.
    let bad_reply = record(reply(1, "2020-06-01 15:00", "hi"));
    assert!(!should_include(&bad_reply, &w).unwrap());

    let bad = archive("Acme", "Acme", vec![tweet(2, "2020-06-01 15:00", "hello", &[])]);
    let err = normalize_all(&[bad], w).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::MalformedTimestamp { value: "2020-06-01 15:00".into() })
    );
}

#[test]
fn text_and_hashtags_are_normalized() {
    let a = archive("Acme", "Acme, Inc.", vec![tweet(7, "Fri Jun 19 12:00:00 +0000 2020", "line one\rline two", &["BLM", "Juneteenth"])]);
    let rows = normalize_all(&[a], InclusionWindow::default()).unwrap();
    assert_eq!(rows[0].text, "line one line two");
    assert_eq!(rows[0].hashtags, "BLM;Juneteenth");
    assert_eq!(rows[0].corporation, "Acme, Inc.");
}

#[test]
fn identifiers_are_unique_across_archives() {
    let a = archive("Acme", "Acme", vec![tweet(7, "Fri Jun 19 12:00:00 +0000 2020", "x", &[])]);
    let b = archive("Globex", "Globex", vec![tweet(7, "Fri Jun 19 13:00:00 +0000 2020", "y", &[])]);
    let err = normalize_all(&[a, b], InclusionWindow::default()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::DuplicateTweet { id: TweetId(7), first: "Acme".into(), second: "Globex".into() })
    );
}

/// IDs above 2^53 survive parsing exactly.
#[test]
fn large_identifiers_keep_full_precision() {
    let id = 1_274_046_120_405_987_329u64;
    let a = archive("Acme", "Acme", vec![tweet(id, "Fri Jun 19 12:00:00 +0000 2020", "big", &[])]);
    let rows = normalize_all(&[a], InclusionWindow::default()).unwrap();
    assert_eq!(rows[0].id, TweetId(id));
    assert_eq!(rows[0].id.to_string(), "1274046120405987329");
}
