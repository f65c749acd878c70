//! Record loader: reference table, per-entity JSON archives, and the manual label table.

use crate::concurrency::map_limited;
use crate::csv_io::read_csv;
use crate::error::PipelineError;
use crate::model::{Archive, Entity, LabelTable, ManualLabelRow, RawRecord, TweetId};
use crate::paths::{discover_archives, ArchiveFile};
use crate::progress::maybe_count_progress;
use ahash::{AHashMap, AHashSet};
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

/// Read `Handle,Corporation` rows. Blank handles are skipped; duplicate handles are an error.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>> {
    let table = read_csv(path)?;
    let h_idx = table.require_column("Handle")?;
    let c_idx = table.require_column("Corporation")?;

    let mut seen = AHashSet::new();
    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let handle = table.cell(row, h_idx).trim();
        if handle.is_empty() {
            continue;
        }
        if !seen.insert(handle.to_string()) {
            bail!("{}: duplicate handle '{}'", path.display(), handle);
        }
        out.push(Entity { handle: handle.to_string(), name: table.cell(row, c_idx).trim().to_string() });
    }
    tracing::debug!(path = %path.display(), entities = out.len(), "loaded reference table");
    Ok(out)
}

/// handle -> display name
pub fn handle_map(entities: &[Entity]) -> AHashMap<&str, &str> {
    entities.iter().map(|e| (e.handle.as_str(), e.name.as_str())).collect()
}

/// Parse one archive file: a JSON array of records.
pub fn read_archive(path: &Path) -> Result<Vec<RawRecord>> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let records: Vec<RawRecord> =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    Ok(records)
}

/// Load every archive under `dir`. Every archive handle must be in the reference table;
/// that is checked for all files before any of them is parsed.
pub fn load_archives(dir: &Path, entities: &[Entity], file_concurrency: usize, progress: bool) -> Result<Vec<Archive>> {
    let names = handle_map(entities);
    let files = discover_archives(dir)?;
    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "no archives found");
    }

    let mut jobs: Vec<(ArchiveFile, String)> = Vec::with_capacity(files.len());
    for f in files {
        let name = names
            .get(f.handle.as_str())
            .ok_or_else(|| anyhow!(PipelineError::MissingMapping { handle: f.handle.clone() }))?;
        jobs.push((f, name.to_string()));
    }

    let pb = maybe_count_progress(progress, jobs.len() as u64, "Loading archives");
    let archives = map_limited(&jobs, file_concurrency, |(file, name)| {
        let records = read_archive(&file.path)?;
        tracing::debug!(handle = %file.handle, records = records.len(), "archive loaded");
        if let Some(pb) = &pb { pb.inc(1); }
        Ok(Archive { handle: file.handle.clone(), name: name.clone(), records })
    })?;
    if let Some(pb) = pb { pb.finish_with_message("archives loaded"); }

    tracing::info!(archives = archives.len(), records = archives.iter().map(|a| a.records.len()).sum::<usize>(), "loaded archives");
    Ok(archives)
}

/// Boolean cell: True/False, true/false, 1/0, 1.0/0.0, yes/no.
/// Empty cells are null.
pub fn parse_flag(cell: &str) -> Option<Option<bool>> {
    let s = cell.trim();
    if s.is_empty() {
        return Some(None);
    }
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" | "t" => Some(Some(true)),
        "false" | "0" | "0.0" | "no" | "n" | "f" => Some(Some(false)),
        "nan" | "none" | "null" => Some(None),
        _ => None,
    }
}

/// Render a nullable flag the way it is read back.
pub fn format_flag(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "True",
        Some(false) => "False",
        None => "",
    }
}

/// Read the manual label table. `ID` and `Handle` are required; every other column is a
/// boolean category flag, kept in header order.
pub fn load_label_table(path: &Path) -> Result<LabelTable> {
    let table = read_csv(path)?;
    let id_idx = table.require_column("ID")?;
    let h_idx = table.require_column("Handle")?;

    let flag_cols: Vec<usize> = (0..table.header.len()).filter(|&i| i != id_idx && i != h_idx).collect();
    let categories: Vec<String> = flag_cols.iter().map(|&i| table.header[i].trim().to_string()).collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let line = n + 2;
        let raw_id = table.cell(row, id_idx);
        let id: TweetId = raw_id
            .parse()
            .map_err(|e| anyhow!("{} row {}: bad ID {:?}: {}", path.display(), line, raw_id, e))?;
        let mut flags = Vec::with_capacity(flag_cols.len());
        for (&i, name) in flag_cols.iter().zip(&categories) {
            let cell = table.cell(row, i);
            let v = parse_flag(cell)
                .ok_or_else(|| anyhow!("{} row {}: column '{}' is not boolean: {:?}", path.display(), line, name, cell))?;
            flags.push(v);
        }
        rows.push(ManualLabelRow { id, handle: table.cell(row, h_idx).trim().to_string(), flags });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), categories = ?categories, "loaded label table");
    Ok(LabelTable { categories, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(parse_flag("True"), Some(Some(true)));
        assert_eq!(parse_flag(" false "), Some(Some(false)));
        assert_eq!(parse_flag("1.0"), Some(Some(true)));
        assert_eq!(parse_flag(""), Some(None));
        assert_eq!(parse_flag("maybe"), None);
        for v in [Some(true), Some(false), None] {
            assert_eq!(parse_flag(format_flag(v)), Some(v));
        }
    }
}
