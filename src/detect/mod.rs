//! Blank and watermark-only page detection over extracted page texts.
//!
//! Everything in here is a pure function of its inputs: no I/O, no shared
//! state between documents.

use anyhow::{Result, bail};
use serde::Serialize;

mod analyze;
mod empty;
mod watermark;

pub use analyze::{
    DocumentAnalysis, ValidationMismatch, analyze_document, merge_page_lists,
    validate_blank_pages,
};
pub use empty::find_empty_pages;
pub use watermark::{
    WatermarkCandidate, find_watermark_pages, is_page_number, order_by_length,
    refine_watermark_pages,
};

pub const DEFAULT_MIN_LEN: usize = 5;
pub const DEFAULT_MAX_LEN: usize = 200;

/// Character-length window for watermark candidates: `min_len` inclusive,
/// `max_len` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionConfig {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl DetectionConfig {
    pub fn new(min_len: usize, max_len: usize) -> Result<Self> {
        if min_len == 0 {
            bail!("min-len must be at least 1");
        }
        if min_len > max_len {
            bail!("min-len ({min_len}) must not exceed max-len ({max_len})");
        }

        Ok(Self { min_len, max_len })
    }
}
