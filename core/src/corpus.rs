use crate::DocId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One crawled article. Immutable once created; `url` is unique within a
/// corpus snapshot and `id` is never reassigned, even across merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub url: String,
    pub title: String,
    pub content: String,
    pub publish_date: Option<String>,
    #[serde(default)]
    pub outgoing_links: Vec<String>,
    pub depth: u32,
    pub source: String,
}

/// Load one corpus snapshot file (a JSON array of documents).
pub fn load_file(path: &Path) -> Result<Vec<Document>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read corpus file {}", path.display()))?;
    let docs: Vec<Document> = serde_json::from_str(&data)
        .with_context(|| format!("parse corpus file {}", path.display()))?;
    Ok(docs)
}

/// Load a corpus file if it exists; a missing file is an empty corpus, so
/// the first crawl run against a fresh output path just works.
pub fn load_file_or_empty(path: &Path) -> Result<Vec<Document>> {
    if path.exists() {
        load_file(path)
    } else {
        Ok(Vec::new())
    }
}

/// Load every `*.json` corpus file under a directory, in file-name order,
/// deduplicating by url (first occurrence wins). Documents whose id was
/// already taken by an earlier file are skipped with a warning rather than
/// corrupting the id space.
pub fn load_dir(dir: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read corpus directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();

    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<DocId> = HashSet::new();
    let mut all = Vec::new();
    for file in files {
        for doc in load_file(&file)? {
            if !seen_urls.insert(doc.url.clone()) {
                continue;
            }
            if !seen_ids.insert(doc.id) {
                tracing::warn!(id = doc.id, url = %doc.url, "duplicate doc id across corpus files, skipping");
                continue;
            }
            all.push(doc);
        }
    }
    Ok(all)
}

/// Load a corpus from either a single snapshot file or a directory of them.
pub fn load_path(path: &Path) -> Result<Vec<Document>> {
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

/// Union-by-url merge: existing entries are retained as-is, new documents
/// are appended, and a new document whose url is already present is
/// discarded in favor of the earlier entry.
pub fn merge(existing: Vec<Document>, new_docs: Vec<Document>) -> Vec<Document> {
    let mut urls: HashSet<String> = existing.iter().map(|d| d.url.clone()).collect();
    let mut merged = existing;
    for doc in new_docs {
        if urls.insert(doc.url.clone()) {
            merged.push(doc);
        }
    }
    merged
}

/// First id available for newly crawled documents, continuing after the
/// highest id already persisted. Ids start at 1.
pub fn next_id(docs: &[Document]) -> DocId {
    docs.iter().map(|d| d.id).max().map_or(1, |m| m + 1)
}
