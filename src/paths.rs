use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// One per-entity archive on disk: `<handle>.json`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveFile {
    pub handle: String,
    pub path: PathBuf,
}

fn archive_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([^.][^/\\]*)\.json$").expect("static regex"))
}

/// Handle encoded in an archive file name, or None for anything that is not an archive.
pub fn handle_from_file_name(name: &str) -> Option<&str> {
    archive_name_re().captures(name).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// List archives directly under `dir`, sorted by handle. Non-JSON and hidden files are skipped.
/// A missing or unreadable directory is an error.
pub fn discover_archives(dir: &Path) -> Result<Vec<ArchiveFile>> {
    if !dir.is_dir() {
        bail!("archive directory {} does not exist or is not a directory", dir.display());
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let ent = entry.with_context(|| format!("list archive directory {}", dir.display()))?;
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if let Some(handle) = handle_from_file_name(name) {
                out.push(ArchiveFile { handle: handle.to_string(), path: ent.path().to_path_buf() });
            } else {
                tracing::debug!(file = name, "ignoring non-archive file");
            }
        }
    }
    out.sort_by(|a, b| a.handle.cmp(&b.handle));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_names() {
        assert_eq!(handle_from_file_name("Acme.json"), Some("Acme"));
        assert_eq!(handle_from_file_name("Acme.JSON"), Some("Acme"));
        assert_eq!(handle_from_file_name(".Acme.json"), None);
        assert_eq!(handle_from_file_name("Acme.csv"), None);
        assert_eq!(handle_from_file_name("Acme.json.bak"), None);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo-json");
        let err = discover_archives(&missing).unwrap_err();
        assert!(err.to_string().contains("typo-json"), "{err}");

        std::fs::write(dir.path().join("Acme.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let found = discover_archives(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].handle, "Acme");
    }
}
