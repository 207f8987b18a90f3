use serde::{Deserialize, Serialize};

use crate::detect::{DetectionConfig, DocumentAnalysis, ValidationMismatch};

/// Per-document page texts as written by `extract`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub n_pages: usize,
    #[serde(default)]
    pub n_chars: usize,
    pub page_texts: Vec<String>,
    #[serde(default)]
    pub page_summaries: Vec<PageSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub n_chars: usize,
    pub n_lines: usize,
}

impl PageSummary {
    /// Characters exclude the newlines between lines.
    pub fn of(text: &str) -> Self {
        let lines = text.split('\n').collect::<Vec<&str>>();
        Self {
            n_chars: lines.iter().map(|line| line.chars().count()).sum(),
            n_lines: lines.len(),
        }
    }
}

impl DocumentSummary {
    pub fn from_pages(name: String, path: String, page_texts: Vec<String>) -> Self {
        let page_summaries = page_texts
            .iter()
            .map(|text| PageSummary::of(text))
            .collect::<Vec<PageSummary>>();

        Self {
            name,
            path,
            n_pages: page_texts.len(),
            n_chars: page_texts.iter().map(|text| text.chars().count()).sum(),
            page_texts,
            page_summaries,
        }
    }

    /// Stored summaries, or ones computed from the page texts when the file
    /// predates them.
    pub fn page_summaries(&self) -> Vec<PageSummary> {
        if self.page_summaries.len() == self.page_texts.len() {
            self.page_summaries.clone()
        } else {
            self.page_texts
                .iter()
                .map(|text| PageSummary::of(text))
                .collect()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub summary_dir: String,
    pub ground_truth_path: Option<String>,
    pub config: DetectionConfig,
    pub counts: CorpusCounts,
    pub mismatches: Vec<ValidationMismatch>,
    pub documents: Vec<RankedDocument>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusCounts {
    pub documents_found: usize,
    pub documents_analyzed: usize,
    pub documents_validated: usize,
    pub documents_without_ground_truth: usize,
    pub documents_with_blank_pages: usize,
    pub empty_pages: usize,
    pub watermark_pages: usize,
    pub mismatches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    pub rank: usize,
    pub validated: bool,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyPage {
    pub document: String,
    pub page: usize,
    pub n_chars: usize,
    pub n_lines: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_summary_counts_lines_and_characters() {
        assert_eq!(
            PageSummary::of("ab\ncdé"),
            PageSummary {
                n_chars: 5,
                n_lines: 2
            }
        );
        assert_eq!(
            PageSummary::of(""),
            PageSummary {
                n_chars: 0,
                n_lines: 1
            }
        );
    }

    #[test]
    fn summary_deserializes_with_only_page_texts() {
        let raw = r#"{ "page_texts": ["", "Page 2"] }"#;
        let summary: DocumentSummary =
            serde_json::from_str(raw).expect("minimal summary should deserialize");
        assert!(summary.name.is_empty());
        assert_eq!(summary.page_texts.len(), 2);
        assert_eq!(summary.page_summaries()[1].n_chars, 6);
    }
}
