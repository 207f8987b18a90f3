use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::detect::{DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, DetectionConfig};

#[derive(Parser, Debug)]
#[command(
    name = "blankpages",
    version,
    about = "Find empty and watermark-only pages in extracted document text"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract per-page text from PDFs with pdftotext.
    Extract(ExtractArgs),
    /// Analyze a single document summary.
    Detect(DetectArgs),
    /// Analyze a directory of summaries and rank documents by blank pages.
    Corpus(CorpusArgs),
    /// List the shortest pages across a directory of summaries.
    Survey(SurveyArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct WindowArgs {
    /// Shortest watermark considered, in characters.
    #[arg(long, default_value_t = DEFAULT_MIN_LEN)]
    pub min_len: usize,

    /// Watermarks must be shorter than this many characters.
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    pub max_len: usize,
}

impl WindowArgs {
    pub fn config(self) -> Result<DetectionConfig> {
        DetectionConfig::new(self.min_len, self.max_len)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value = ".cache/blankpages/summaries")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub max_pages: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[arg(long)]
    pub document: PathBuf,

    #[command(flatten)]
    pub window: WindowArgs,

    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    #[arg(long, default_value = ".cache/blankpages/summaries")]
    pub summary_dir: PathBuf,

    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    /// Also analyze documents that have no ground-truth entry.
    #[arg(long, default_value_t = false)]
    pub all_documents: bool,

    /// Stop after this many summaries; 0 or less means no limit.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_files: i64,

    #[command(flatten)]
    pub window: WindowArgs,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub fail_on_mismatch: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SurveyArgs {
    #[arg(long, default_value = ".cache/blankpages/summaries")]
    pub summary_dir: PathBuf,

    #[arg(long, default_value_t = 200)]
    pub prefix_len: usize,

    #[arg(long, default_value_t = 2)]
    pub per_document: usize,

    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_files: i64,

    #[arg(long)]
    pub output: Option<PathBuf>,
}
