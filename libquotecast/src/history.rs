//! Persisted posting history
//!
//! One line per author: `author,hash1,hash2,...`. Hashes are 128-bit content
//! addresses of posted quotes; repeats accumulate (multiset semantics), so a
//! quote posted twice weighs twice as much against that author. Updates
//! rewrite the whole record set through a single held file handle and only
//! then truncate, so a partial write can never lose unrelated lines.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Flat-file store mapping authors to the hashes of their posted quotes
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history multiset for each requested author
    ///
    /// Authors without a record get an empty multiset; a missing history
    /// file is created empty (touch-then-open), never reported as an error.
    pub fn load(&self, authors: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let mut file = self.open()?;
        let content = self.read_all(&mut file)?;
        let mut records = parse_records(&content);

        Ok(authors
            .iter()
            .map(|author| {
                let hashes = records.remove(author.as_str()).unwrap_or_default();
                (author.clone(), hashes)
            })
            .collect())
    }

    /// Record one more posted quote for `author`
    ///
    /// Creates the author's line on first append and leaves every other line
    /// untouched. The read-modify-write cycle runs within one file handle.
    pub fn append(&self, author: &str, hash: &str) -> Result<()> {
        let mut file = self.open()?;
        let content = self.read_all(&mut file)?;
        let updated = append_record(&content, author, hash);

        file.seek(SeekFrom::Start(0)).map_err(|e| self.write_err(e))?;
        file.write_all(updated.as_bytes())
            .map_err(|e| self.write_err(e))?;
        file.set_len(updated.len() as u64)
            .map_err(|e| self.write_err(e))?;
        Ok(())
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                    path: self.path.display().to_string(),
                    source: e,
                })?;
            }
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| {
                StoreError::Open {
                    path: self.path.display().to_string(),
                    source: e,
                }
                .into()
            })
    }

    fn read_all(&self, file: &mut File) -> Result<String> {
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| StoreError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(content)
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Parse `author,hash1,hash2,...` lines into per-author multisets
fn parse_records(content: &str) -> HashMap<&str, Vec<String>> {
    let mut records = HashMap::new();
    for line in content.lines() {
        let mut fields = line.split(',');
        let Some(author) = fields.next() else {
            continue;
        };
        if author.is_empty() {
            continue;
        }
        let hashes: Vec<String> = fields
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        records.insert(author, hashes);
    }
    records
}

/// Append `hash` to the author's line, creating the line if needed
fn append_record(content: &str, author: &str, hash: &str) -> String {
    let prefix = format!("{},", author);
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut found = false;

    for line in lines.iter_mut() {
        if line == author || line.starts_with(&prefix) {
            line.push(',');
            line.push_str(hash);
            found = true;
            break;
        }
    }

    if !found {
        lines.push(format!("{},{}", author, hash));
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}

/// Stable 128-bit content address of a quote: the first 16 bytes of the
/// SHA-256 of its UTF-8 encoding, lowercase hex
pub fn quote_hash(quote: &str) -> String {
    let digest = Sha256::digest(quote.as_bytes());
    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}
