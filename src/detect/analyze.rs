use std::collections::BTreeSet;

use serde::Serialize;

use super::DetectionConfig;
use super::empty::find_empty_pages;
use super::watermark::find_watermark_pages;

/// Detector output for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAnalysis {
    pub name: String,
    pub total_pages: usize,
    pub empty_pages: Vec<usize>,
    /// Ascending page indices carrying only the watermark.
    pub watermark_pages: Vec<usize>,
    pub watermark_text: Option<String>,
    /// Full page texts for `watermark_pages`, index-aligned.
    pub watermark_page_texts: Vec<String>,
}

impl DocumentAnalysis {
    /// Union of empty and watermark pages, ascending and deduplicated.
    pub fn blank_pages(&self) -> Vec<usize> {
        merge_page_lists(&self.empty_pages, &self.watermark_pages)
    }

    pub fn anomaly_count(&self) -> usize {
        self.empty_pages.len() + self.watermark_pages.len()
    }
}

/// Hand-labelled blank pages disagree with what the detector found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error(
    "blank pages for {document} do not match ground truth: expected {expected:?}, detected {detected:?} (missing {missing:?}, extra {extra:?})"
)]
pub struct ValidationMismatch {
    pub document: String,
    pub expected: Vec<i64>,
    pub detected: Vec<i64>,
    /// Expected but not detected.
    pub missing: Vec<i64>,
    /// Detected but not expected.
    pub extra: Vec<i64>,
}

pub fn merge_page_lists(left: &[usize], right: &[usize]) -> Vec<usize> {
    left.iter()
        .chain(right.iter())
        .copied()
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect()
}

/// Run the empty-page and watermark detectors over one document.
pub fn analyze_document<S: AsRef<str>>(
    name: &str,
    page_texts: &[S],
    config: &DetectionConfig,
) -> DocumentAnalysis {
    let empty_pages = find_empty_pages(page_texts);

    let (watermark_pages, watermark_text) =
        match find_watermark_pages(page_texts, config.min_len, config.max_len) {
            Some(candidate) => {
                let mut pages = candidate.page_indices;
                pages.sort_unstable();
                (pages, Some(candidate.text))
            }
            None => (Vec::new(), None),
        };

    let watermark_page_texts = watermark_pages
        .iter()
        .map(|&index| page_texts[index].as_ref().to_string())
        .collect();

    DocumentAnalysis {
        name: name.to_string(),
        total_pages: page_texts.len(),
        empty_pages,
        watermark_pages,
        watermark_text,
        watermark_page_texts,
    }
}

/// Compare detected blank pages against a ground-truth list.
///
/// Equality is exact: same length and same values in the same order. The
/// expected list is not re-sorted.
pub fn validate_blank_pages(
    analysis: &DocumentAnalysis,
    expected: &[i64],
) -> Result<(), ValidationMismatch> {
    let detected = analysis
        .blank_pages()
        .into_iter()
        .map(|page| page as i64)
        .collect::<Vec<i64>>();

    if detected.as_slice() == expected {
        return Ok(());
    }

    let expected_set = expected.iter().copied().collect::<BTreeSet<i64>>();
    let detected_set = detected.iter().copied().collect::<BTreeSet<i64>>();

    Err(ValidationMismatch {
        document: analysis.name.clone(),
        expected: expected.to_vec(),
        missing: expected_set.difference(&detected_set).copied().collect(),
        extra: detected_set.difference(&expected_set).copied().collect(),
        detected,
    })
}
