use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::DetectArgs;
use crate::commands::report::render_document;
use crate::detect::{analyze_document, validate_blank_pages};
use crate::ground_truth::GroundTruth;
use crate::model::DocumentSummary;
use crate::util::{base_name, read_json};

pub fn run(args: DetectArgs) -> Result<()> {
    let config = args.window.config()?;
    let summary: DocumentSummary = read_json(&args.document)?;
    let name = base_name(&args.document);

    let analysis = analyze_document(&name, &summary.page_texts, &config);
    info!(
        document = %name,
        pages = analysis.total_pages,
        empty = analysis.empty_pages.len(),
        watermark = analysis.watermark_pages.len(),
        "document analyzed"
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &analysis)
            .context("failed to serialize analysis")?;
        writeln!(stdout).context("failed to write analysis")?;
    } else {
        write!(stdout, "{}", render_document(&analysis)).context("failed to write analysis")?;
    }

    let Some(path) = args.ground_truth.as_deref() else {
        return Ok(());
    };
    let ground_truth = GroundTruth::load(path)?;
    match ground_truth.lookup(&name) {
        Some(expected) => {
            validate_blank_pages(&analysis, expected)?;
            info!(document = %name, "blank pages match ground truth");
        }
        None => warn!(document = %name, "no ground truth for document"),
    }

    Ok(())
}
