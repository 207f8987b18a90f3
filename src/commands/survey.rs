use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::SurveyArgs;
use crate::model::{DocumentSummary, SurveyPage};
use crate::util::{
    base_name, list_files_with_extension, one_line_prefix, read_json, write_json_pretty,
};

pub fn run(args: SurveyArgs) -> Result<()> {
    let mut paths = list_files_with_extension(&args.summary_dir, "json")?;
    if args.max_files > 0 {
        paths.truncate(args.max_files as usize);
    }
    info!(documents = paths.len(), "surveying page lengths");

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        let summary: DocumentSummary = read_json(path)?;
        documents.push((base_name(path), summary));
    }

    let pages = shortest_pages(&documents, args.prefix_len);

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render_survey(&pages, args.per_document))
        .context("failed to write survey")?;
    stdout.flush().context("failed to flush survey")?;

    if let Some(output) = args.output.as_deref() {
        write_json_pretty(output, &pages)?;
        info!(path = %output.display(), pages = pages.len(), "wrote page survey");
    }

    Ok(())
}

/// Every page of every document, shortest first.
pub fn shortest_pages(
    documents: &[(String, DocumentSummary)],
    prefix_len: usize,
) -> Vec<SurveyPage> {
    let mut pages = documents
        .iter()
        .flat_map(|(name, summary)| {
            summary
                .page_summaries()
                .into_iter()
                .zip(&summary.page_texts)
                .enumerate()
                .map(move |(page, (page_summary, text))| SurveyPage {
                    document: name.clone(),
                    page,
                    n_chars: page_summary.n_chars,
                    n_lines: page_summary.n_lines,
                    text: one_line_prefix(text, prefix_len),
                })
        })
        .collect::<Vec<SurveyPage>>();

    pages.sort_by(|left, right| {
        (left.n_chars, left.n_lines, &left.document, left.page).cmp(&(
            right.n_chars,
            right.n_lines,
            &right.document,
            right.page,
        ))
    });
    pages
}

/// At most `per_document` lines per document, numbered by global position.
pub fn render_survey(pages: &[SurveyPage], per_document: usize) -> String {
    let mut shown = HashMap::<&str, usize>::new();
    let mut out = String::new();

    for (position, page) in pages.iter().enumerate() {
        let count = shown.entry(page.document.as_str()).or_insert(0);
        *count += 1;
        if *count > per_document {
            continue;
        }

        let location = format!("{}:{}", page.document, page.page);
        out.push_str(&format!(
            "{:6}: {:4} l {:5} c - {:<30} \"{}\"\n",
            position, page.n_lines, page.n_chars, location, page.text
        ));
    }

    out
}
