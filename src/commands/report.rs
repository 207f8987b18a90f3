use std::cmp::Reverse;
use std::fmt::Write as _;

use crate::detect::DocumentAnalysis;
use crate::model::RankedDocument;

const LISTED_PAGES: usize = 10;
const PREVIEW_CHARS: usize = 50;

/// Order documents by blank-page count (most first), then watermark count
/// (most first), then page count and name (ascending).
pub fn rank_documents(documents: Vec<(DocumentAnalysis, bool)>) -> Vec<RankedDocument> {
    let mut documents = documents;
    documents.sort_by(|(left, _), (right, _)| {
        (
            Reverse(left.anomaly_count()),
            Reverse(left.watermark_pages.len()),
            left.total_pages,
            &left.name,
        )
            .cmp(&(
                Reverse(right.anomaly_count()),
                Reverse(right.watermark_pages.len()),
                right.total_pages,
                &right.name,
            ))
    });

    documents
        .into_iter()
        .enumerate()
        .map(|(index, (analysis, validated))| RankedDocument {
            rank: index + 1,
            validated,
            analysis,
        })
        .collect()
}

pub fn render_document(analysis: &DocumentAnalysis) -> String {
    let watermark = analysis
        .watermark_text
        .as_deref()
        .map(|text| format!("\"{}\"", text.replace('\n', " ")))
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:4} {:4} {:4} {:<40} {}",
        analysis.total_pages,
        analysis.empty_pages.len(),
        analysis.watermark_pages.len(),
        analysis.name,
        watermark
    );

    if !analysis.empty_pages.is_empty() {
        let shown = &analysis.empty_pages[..analysis.empty_pages.len().min(LISTED_PAGES)];
        let _ = writeln!(out, "\tempty: {shown:?}");
    }

    if !analysis.watermark_pages.is_empty() {
        let shown = &analysis.watermark_pages[..analysis.watermark_pages.len().min(LISTED_PAGES)];
        let _ = writeln!(out, "\twatermark: {shown:?}");
        for (index, text) in shown.iter().zip(&analysis.watermark_page_texts) {
            let preview = text.chars().take(PREVIEW_CHARS).collect::<String>();
            let _ = writeln!(
                out,
                "\t{:3}: {:4} {:?}",
                index,
                text.chars().count(),
                preview
            );
        }
    }

    out
}

/// Text report for documents with at least one blank page; clean documents
/// stay in the counts and JSON report only.
pub fn render_report(documents: &[RankedDocument]) -> String {
    documents
        .iter()
        .filter(|document| document.analysis.anomaly_count() > 0)
        .map(|document| render_document(&document.analysis))
        .collect()
}
