#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tweetlink::{Archive, RawRecord, TweetLinkETL};

/// Archive record shaped like the API's extended tweet JSON.
pub fn tweet(id: u64, created_at: &str, text: &str, hashtags: &[&str]) -> Value {
    json!({
        "created_at": created_at,
        "id": id,
        "id_str": id.to_string(),
        "full_text": text,
        "truncated": false,
        "in_reply_to_user_id": null,
        "in_reply_to_status_id": null,
        "entities": {
            "hashtags": hashtags.iter().map(|h| json!({ "text": h, "indices": [0, 1] })).collect::<Vec<_>>(),
            "user_mentions": [],
            "urls": []
        },
        "user": { "name": "Acme, Inc.", "screen_name": "Acme" },
        "retweet_count": 3,
        "lang": "en"
    })
}

pub fn reply(id: u64, created_at: &str, text: &str) -> Value {
    let mut v = tweet(id, created_at, text, &[]);
    v["in_reply_to_user_id"] = json!(42);
    v
}

/// A retweet wrapper: its own ID, with the original embedded.
pub fn retweet(id: u64, created_at: &str, original: Value) -> Value {
    let text = format!("RT @someone: {}", original["full_text"].as_str().unwrap_or(""));
    let mut v = tweet(id, created_at, &text, &[]);
    v["retweeted_status"] = original;
    v
}

pub fn with_media(mut v: Value, urls: &[&str]) -> Value {
    let media: Vec<Value> = urls.iter().map(|u| json!({ "media_url": u, "type": "photo" })).collect();
    v["extended_entities"] = json!({ "media": media });
    v
}

pub fn record(v: Value) -> RawRecord {
    serde_json::from_value(v).unwrap()
}

pub fn archive(handle: &str, name: &str, records: Vec<Value>) -> Archive {
    Archive { handle: handle.into(), name: name.into(), records: records.into_iter().map(record).collect() }
}

pub fn write_text(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

pub fn write_archive(dir: &Path, handle: &str, records: &[Value]) -> PathBuf {
    let p = dir.join(format!("{handle}.json"));
    write_text(&p, &serde_json::to_string_pretty(&Value::Array(records.to_vec())).unwrap());
    p
}

/// Paths of a dataset laid out on disk.
pub struct Dataset {
    pub base: PathBuf,
    pub reference: PathBuf,
    pub archives: PathBuf,
    pub labels: PathBuf,
    pub out: PathBuf,
}

impl Dataset {
    pub fn etl(&self) -> TweetLinkETL {
        TweetLinkETL::new()
            .reference_table(&self.reference)
            .archives_dir(&self.archives)
            .label_table(&self.labels)
            .out_dir(&self.out)
            .media_dir(self.base.join("media"))
            .progress(false)
    }
}

pub const LABELS_HEADER: &str = "ID,Handle,BLM,Juneteenth,Money,Formal Statement,Diversity";

/// Acme's and Globex's archives, from the reference table:
///
/// Acme (`Acme, Inc.`):
///   100 qualifying, labeled directly
///   101 reply, 102 @-mention, 103 before the window: all dropped
///   305 retweet of ExternalOrg's 200, labeled via 200, carries one photo
///   104 qualifying, `\r` in the text, unlabeled
/// Globex (`Globex Corporation`):
///   400 qualifying, labeled directly
///   401 exactly at the window end: dropped
///   402 retweet of unlabeled 999: kept, out of scope
///
/// Label table: 100 (Acme), 200 (ExternalOrg), 400 (Globex).
/// Expected: 5 tweet rows, 3 in scope, 1 retweet link.
/// `notes.txt` next to the archives must be ignored.
pub fn make_dataset_basic() -> Dataset {
    let base = tempfile::tempdir().unwrap().into_path();
    let reference = base.join("fortune-100.csv");
    let archives = base.join("fortune-100-json");
    let labels = base.join("blm-tweets-categorized.csv");
    let out = base.join("out");

    write_text(&reference, "Rank,Handle,Corporation\n1,Acme,\"Acme, Inc.\"\n2,Globex,Globex Corporation\n");

    let original = with_media(
        tweet(200, "Thu Jun 18 20:00:00 +0000 2020", "Happy Juneteenth", &["Juneteenth"]),
        &["http://pbs.twimg.com/media/EaJ1.jpg"],
    );
    write_archive(
        &archives,
        "Acme",
        &[
            tweet(100, "Mon Jun 01 15:00:00 +0000 2020", "We stand with our community. #BLM", &["BLM"]),
            reply(101, "Mon Jun 01 16:00:00 +0000 2020", "Thanks for reaching out"),
            tweet(102, "Mon Jun 01 17:00:00 +0000 2020", "@someone we hear you", &[]),
            tweet(103, "Wed May 20 09:00:00 +0000 2020", "Spring launch", &[]),
            retweet(305, "Fri Jun 19 12:00:00 +0000 2020", original),
            tweet(104, "Sat Jul 25 10:00:00 +0000 2020", "Summer\rsale", &["sale", "summer"]),
        ],
    );
    write_archive(
        &archives,
        "Globex",
        &[
            tweet(400, "Mon Jun 01 18:00:00 +0000 2020", "Juneteenth is now a paid holiday", &["Juneteenth"]),
            tweet(401, "Sun Jul 26 00:00:00 +0000 2020", "Late post", &[]),
            retweet(402, "Mon Jun 01 19:00:00 +0000 2020", tweet(999, "Mon Jun 01 10:00:00 +0000 2020", "Unrelated", &[])),
        ],
    );
    write_text(&archives.join("notes.txt"), "not an archive\n");

    write_text(
        &labels,
        &format!(
            "{LABELS_HEADER}\n\
             100,Acme,True,False,False,True,False\n\
             200,ExternalOrg,False,True,False,False,False\n\
             400,Globex,False,True,True,False,True\n"
        ),
    );

    Dataset { base, reference, archives, labels, out }
}
