//! Minimal CSV codec for the reference, label and output tables.
//! Comma separated, `\n` line ends, RFC 4180 quoting. The reader also accepts
//! `\r\n`, a leading BOM, and quoted fields spanning lines.

use anyhow::{bail, Context, Result};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A fully loaded CSV file: header plus data rows.
#[derive(Clone, Debug, Default)]
pub struct CsvTable {
    pub path: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        match self.column(name) {
            Some(i) => Ok(i),
            None => bail!("{}: missing column '{}' (header: {:?})", self.path.display(), name, self.header),
        }
    }

    /// Cell accessor; short rows read as empty.
    #[inline]
    pub fn cell<'a>(&self, row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(|s| s.as_str()).unwrap_or("")
    }
}

pub fn read_csv(path: &Path) -> Result<CsvTable> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut records = parse_records(&text).with_context(|| format!("parse {}", path.display()))?;
    if records.is_empty() {
        bail!("{}: empty CSV (no header)", path.display());
    }
    let header = records.remove(0);
    Ok(CsvTable { path: path.to_path_buf(), header, rows: records })
}

/// Split CSV text into records. Blank lines are skipped.
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut dirty = false;
    let mut line = 1usize;
    let mut quote_line = 0usize;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => {
                    if c == '\n' { line += 1; }
                    field.push(c);
                }
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
                dirty = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                dirty = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                line += 1;
                if dirty {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                dirty = false;
            }
            _ => {
                field.push(c);
                dirty = true;
            }
        }
    }
    if in_quotes {
        bail!("unterminated quoted field starting on line {}", quote_line);
    }
    if dirty {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Quote a field only when it needs it.
pub fn quote_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

/// Buffered CSV writer. Creates parent directories on open.
pub struct CsvWriter {
    path: PathBuf,
    w: BufWriter<File>,
    rows: u64,
}

impl CsvWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self { path: path.to_path_buf(), w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), f), rows: 0 })
    }

    pub fn write_record<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for f in fields {
            if !first {
                self.w.write_all(b",")?;
            }
            first = false;
            self.w.write_all(quote_field(f.as_ref()).as_bytes())?;
        }
        self.w.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of records written (header included).
    pub fn finish(mut self) -> Result<u64> {
        self.w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_with_commas_quotes_and_newlines() {
        let text = "ID,Text\r\n1,\"hello, \"\"world\"\"\nsecond line\"\n\n2,plain\n";
        let recs = parse_records(text).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1], vec!["1", "hello, \"world\"\nsecond line"]);
        assert_eq!(recs[2], vec!["2", "plain"]);
    }

    #[test]
    fn empty_cells_and_bom() {
        let recs = parse_records("\u{feff}a,b,c\n1,,\n").unwrap();
        assert_eq!(recs[0], vec!["a", "b", "c"]);
        assert_eq!(recs[1], vec!["1", "", ""]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(parse_records("a\n\"oops\n").is_err());
    }

    #[test]
    fn writer_output_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nested").join("t.csv");
        let mut w = CsvWriter::create(&p, 0).unwrap();
        w.write_record(["ID", "Text"]).unwrap();
        w.write_record(["7", "a \"b\", c"]).unwrap();
        assert_eq!(w.finish().unwrap(), 2);
        let t = read_csv(&p).unwrap();
        assert_eq!(t.header, vec!["ID", "Text"]);
        assert_eq!(t.rows, vec![vec!["7".to_string(), "a \"b\", c".to_string()]]);
    }
}
