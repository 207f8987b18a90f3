use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::model::DocumentSummary;
use crate::util::{base_name, ensure_directory, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    ensure_directory(&args.output_dir)?;

    let mut written = 0usize;
    for pdf_path in &args.inputs {
        let pages = extract_pages_with_pdftotext(pdf_path, args.max_pages)?;
        let page_texts = pages
            .iter()
            .map(|page| normalize_page_text(page))
            .collect::<Vec<String>>();

        let name = base_name(pdf_path);
        if name.is_empty() {
            warn!(path = %pdf_path.display(), "skipping input without a file name");
            continue;
        }

        let summary =
            DocumentSummary::from_pages(name.clone(), pdf_path.display().to_string(), page_texts);
        let summary_path = args.output_dir.join(format!("{name}.json"));
        write_json_pretty(&summary_path, &summary)?;

        info!(
            pdf = %pdf_path.display(),
            summary = %summary_path.display(),
            pages = summary.n_pages,
            chars = summary.n_chars,
            "wrote page summary"
        );
        written += 1;
    }

    info!(documents = written, "extract completed");
    Ok(())
}

fn extract_pages_with_pdftotext(pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
}

/// pdftotext ends every page with a form feed, leaving one empty chunk
/// after the last page.
fn split_pages(raw: &str) -> Vec<String> {
    let mut pages = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect::<Vec<String>>();

    if pages.last().is_some_and(|last| last.trim().is_empty()) {
        pages.pop();
    }

    pages
}

/// Trim every line, break lines on double spaces and drop what is left
/// blank. A page of whitespace comes out as the empty string.
pub fn normalize_page_text(page: &str) -> String {
    page.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pages_drops_only_the_trailing_chunk() {
        let raw = "first\n\u{000C}\n\u{000C}third\u{0000}\n\u{000C}";
        let pages = split_pages(raw);
        assert_eq!(pages, vec!["first\n", "\n", "third\n"]);
    }

    #[test]
    fn normalize_page_text_collapses_layout_whitespace() {
        assert_eq!(
            normalize_page_text("  Title   Subtitle \n\n\t body line  \n"),
            "Title\nSubtitle\nbody line"
        );
        assert_eq!(normalize_page_text(" \n\t\n"), "");
    }

    #[test]
    fn blank_scans_become_empty_pages() {
        let pages = split_pages("text\u{000C}   \n\u{000C}Scanned by OfficeJet\n\u{000C}");
        let normalized = pages
            .iter()
            .map(|page| normalize_page_text(page))
            .collect::<Vec<String>>();
        assert_eq!(normalized, vec!["text", "", "Scanned by OfficeJet"]);
    }
}
