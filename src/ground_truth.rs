use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

static BLANK_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"blank_pages_\d+").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthManifest {
    pub manifest_version: u32,
    pub entries: Vec<GroundTruthEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    pub document: String,
    /// Comma-separated 1-based page numbers as labelled; `null` means the
    /// document was never labelled.
    #[serde(default)]
    pub pages: Option<String>,
}

/// Hand-labelled blank pages keyed by document label.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    blank_pages: BTreeMap<String, Option<Vec<i64>>>,
}

impl GroundTruth {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: GroundTruthManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let ground_truth = Self::from_manifest(&manifest)?;
        info!(
            path = %path.display(),
            entries = ground_truth.blank_pages.len(),
            labelled = ground_truth.labelled_count(),
            "loaded ground truth"
        );
        Ok(ground_truth)
    }

    pub fn from_manifest(manifest: &GroundTruthManifest) -> Result<Self> {
        let mut blank_pages = BTreeMap::new();
        for entry in &manifest.entries {
            let pages = entry
                .pages
                .as_deref()
                .map(parse_page_list)
                .transpose()
                .with_context(|| format!("invalid page list for {}", entry.document))?;
            blank_pages.insert(normalize_label(&entry.document), pages);
        }

        Ok(Self { blank_pages })
    }

    pub fn labelled_count(&self) -> usize {
        self.blank_pages.values().filter(|pages| pages.is_some()).count()
    }

    /// Expected blank pages for a document, zero-based.
    ///
    /// Tries the document name itself, then any `blank_pages_<n>` label it
    /// contains. `None` covers both unknown and unlabelled documents.
    pub fn lookup(&self, document: &str) -> Option<&[i64]> {
        let name = normalize_label(document);
        if let Some(pages) = self.blank_pages.get(&name) {
            return pages.as_deref();
        }

        let label = BLANK_LABEL_RE.find(&name)?;
        self.blank_pages
            .get(label.as_str())
            .and_then(|pages| pages.as_deref())
    }
}

fn normalize_label(name: &str) -> String {
    let trimmed = name.trim();
    match trimmed.len().checked_sub(4) {
        Some(cut)
            if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(".pdf") =>
        {
            trimmed[..cut].to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Parse a labelled page list such as `"1, 3, 12"`.
///
/// Positive numbers are 1-based and shift down by one; zero and negative
/// values are kept as written. An empty field is an empty list.
pub fn parse_page_list(raw: &str) -> Result<Vec<i64>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|item| -> Result<i64> {
            let value = item
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid page number: {:?}", item.trim()))?;
            Ok(if value > 0 { value - 1 } else { value })
        })
        .collect()
}
