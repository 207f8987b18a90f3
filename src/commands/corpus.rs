use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::CorpusArgs;
use crate::commands::report::{rank_documents, render_report};
use crate::detect::{DetectionConfig, ValidationMismatch, analyze_document, validate_blank_pages};
use crate::ground_truth::GroundTruth;
use crate::model::{CorpusCounts, CorpusReport, DocumentSummary, RankedDocument};
use crate::util::{
    base_name, list_files_with_extension, now_utc_string, read_json, write_json_pretty,
};

#[derive(Debug)]
pub struct CorpusOutcome {
    pub counts: CorpusCounts,
    pub mismatches: Vec<ValidationMismatch>,
    pub documents: Vec<RankedDocument>,
}

struct SelectedDocument {
    path: PathBuf,
    name: String,
    expected: Option<Vec<i64>>,
}

pub fn run(args: CorpusArgs) -> Result<()> {
    let config = args.window.config()?;
    let ground_truth = args
        .ground_truth
        .as_deref()
        .map(GroundTruth::load)
        .transpose()?;

    info!(
        summary_dir = %args.summary_dir.display(),
        min_len = config.min_len,
        max_len = config.max_len,
        "starting corpus analysis"
    );

    let outcome = analyze_corpus(
        &args.summary_dir,
        ground_truth.as_ref(),
        args.all_documents,
        args.max_files,
        &config,
    )?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render_report(&outcome.documents)).context("failed to write report")?;
    stdout.flush().context("failed to flush report")?;

    info!(
        analyzed = outcome.counts.documents_analyzed,
        validated = outcome.counts.documents_validated,
        with_blank_pages = outcome.counts.documents_with_blank_pages,
        empty_pages = outcome.counts.empty_pages,
        watermark_pages = outcome.counts.watermark_pages,
        mismatches = outcome.counts.mismatches,
        "corpus analysis completed"
    );

    if let Some(report_path) = args.report_path.as_deref() {
        let report = CorpusReport {
            manifest_version: 1,
            generated_at: now_utc_string(),
            summary_dir: args.summary_dir.display().to_string(),
            ground_truth_path: args
                .ground_truth
                .as_ref()
                .map(|path| path.display().to_string()),
            config,
            counts: outcome.counts.clone(),
            mismatches: outcome.mismatches.clone(),
            documents: outcome.documents,
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote corpus report");
    }

    if args.fail_on_mismatch && !outcome.mismatches.is_empty() {
        bail!(
            "{} of {} validated documents disagree with ground truth",
            outcome.mismatches.len(),
            outcome.counts.documents_validated
        );
    }

    Ok(())
}

/// Analyze every summary in `summary_dir`, validating those with ground
/// truth.
///
/// With ground truth present, documents it does not label are skipped
/// unless `all_documents` is set. `max_files <= 0` means no limit and is
/// applied after that selection.
pub fn analyze_corpus(
    summary_dir: &Path,
    ground_truth: Option<&GroundTruth>,
    all_documents: bool,
    max_files: i64,
    config: &DetectionConfig,
) -> Result<CorpusOutcome> {
    let paths = list_files_with_extension(summary_dir, "json")?;
    let mut counts = CorpusCounts {
        documents_found: paths.len(),
        ..CorpusCounts::default()
    };

    let mut selected = Vec::with_capacity(paths.len());
    for path in paths {
        let name = base_name(&path);
        let expected = ground_truth
            .and_then(|truth| truth.lookup(&name))
            .map(<[i64]>::to_vec);
        if expected.is_none() {
            counts.documents_without_ground_truth += 1;
            if ground_truth.is_some() && !all_documents {
                debug!(document = %name, "skipping document without ground truth");
                continue;
            }
        }
        selected.push(SelectedDocument {
            path,
            name,
            expected,
        });
    }

    if max_files > 0 {
        selected.truncate(max_files as usize);
    }
    info!(documents = selected.len(), "documents selected");

    let mut analyzed = Vec::with_capacity(selected.len());
    let mut mismatches = Vec::new();
    for document in selected {
        let summary: DocumentSummary = read_json(&document.path)?;
        let analysis = analyze_document(&document.name, &summary.page_texts, config);

        let validated = match document.expected.as_deref() {
            Some(expected) => {
                counts.documents_validated += 1;
                if let Err(mismatch) = validate_blank_pages(&analysis, expected) {
                    warn!(
                        document = %mismatch.document,
                        expected = ?mismatch.expected,
                        detected = ?mismatch.detected,
                        missing = ?mismatch.missing,
                        extra = ?mismatch.extra,
                        "ground truth mismatch"
                    );
                    mismatches.push(mismatch);
                }
                true
            }
            None => false,
        };

        counts.documents_analyzed += 1;
        counts.empty_pages += analysis.empty_pages.len();
        counts.watermark_pages += analysis.watermark_pages.len();
        if analysis.anomaly_count() > 0 {
            counts.documents_with_blank_pages += 1;
        }
        analyzed.push((analysis, validated));
    }
    counts.mismatches = mismatches.len();

    Ok(CorpusOutcome {
        counts,
        mismatches,
        documents: rank_documents(analyzed),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::cli::WindowArgs;
    use crate::ground_truth::{GroundTruthEntry, GroundTruthManifest};

    fn write_summary(dir: &Path, name: &str, pages: &[&str]) {
        let summary = DocumentSummary::from_pages(
            name.to_string(),
            format!("{name}.pdf"),
            pages.iter().map(|page| page.to_string()).collect(),
        );
        write_json_pretty(&dir.join(format!("{name}.json")), &summary).expect("write summary");
    }

    fn ground_truth(entries: &[(&str, Option<&str>)]) -> GroundTruth {
        GroundTruth::from_manifest(&GroundTruthManifest {
            manifest_version: 1,
            entries: entries
                .iter()
                .map(|(document, pages)| GroundTruthEntry {
                    document: document.to_string(),
                    pages: pages.map(ToOwned::to_owned),
                })
                .collect(),
        })
        .expect("valid ground truth")
    }

    fn corpus_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        write_summary(
            dir.path(),
            "blank_pages_1",
            &["Intro\nScanned", "Scanned", "", "Body text\nScanned", "Scanned"],
        );
        write_summary(dir.path(), "blank_pages_2", &["one", "", "three"]);
        write_summary(dir.path(), "unlabelled", &["", ""]);
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write note");
        dir
    }

    #[test]
    fn validation_run_skips_unlabelled_documents() {
        let dir = corpus_dir();
        let truth = ground_truth(&[
            ("blank_pages_1.pdf", Some("2, 3, 5")),
            ("blank_pages_2.pdf", Some("2")),
        ]);

        let outcome = analyze_corpus(
            dir.path(),
            Some(&truth),
            false,
            -1,
            &DetectionConfig::default(),
        )
        .expect("corpus run");

        assert_eq!(outcome.counts.documents_found, 3);
        assert_eq!(outcome.counts.documents_analyzed, 2);
        assert_eq!(outcome.counts.documents_validated, 2);
        assert_eq!(outcome.counts.documents_without_ground_truth, 1);
        assert!(outcome.mismatches.is_empty());

        let first = &outcome.documents[0].analysis;
        assert_eq!(first.name, "blank_pages_1");
        assert_eq!(first.watermark_text.as_deref(), Some("Scanned"));
        assert_eq!(first.blank_pages(), vec![1, 2, 4]);
        assert_eq!(outcome.documents[1].analysis.name, "blank_pages_2");
    }

    #[test]
    fn mismatches_are_collected_not_fatal() {
        let dir = corpus_dir();
        let truth = ground_truth(&[
            ("blank_pages_1.pdf", Some("2, 3")),
            ("blank_pages_2.pdf", Some("2")),
        ]);

        let outcome = analyze_corpus(
            dir.path(),
            Some(&truth),
            false,
            0,
            &DetectionConfig::default(),
        )
        .expect("corpus run");

        assert_eq!(outcome.counts.documents_analyzed, 2);
        assert_eq!(outcome.counts.mismatches, 1);
        let mismatch = &outcome.mismatches[0];
        assert_eq!(mismatch.document, "blank_pages_1");
        assert!(mismatch.missing.is_empty());
        assert_eq!(mismatch.extra, vec![4]);
    }

    #[test]
    fn all_documents_includes_unvalidated_ones() {
        let dir = corpus_dir();
        let truth = ground_truth(&[("blank_pages_2.pdf", Some("2"))]);

        let outcome = analyze_corpus(
            dir.path(),
            Some(&truth),
            true,
            -1,
            &DetectionConfig::default(),
        )
        .expect("corpus run");

        assert_eq!(outcome.counts.documents_analyzed, 3);
        assert_eq!(outcome.counts.documents_validated, 1);
        let unlabelled = outcome
            .documents
            .iter()
            .find(|document| document.analysis.name == "unlabelled")
            .expect("unlabelled document analyzed");
        assert!(!unlabelled.validated);
        assert_eq!(unlabelled.analysis.empty_pages, vec![0, 1]);
    }

    #[test]
    fn max_files_applies_after_selection() {
        let dir = corpus_dir();
        let outcome = analyze_corpus(dir.path(), None, false, 2, &DetectionConfig::default())
            .expect("corpus run");

        assert_eq!(outcome.counts.documents_analyzed, 2);
        assert_eq!(outcome.counts.documents_validated, 0);
        let mut names = outcome
            .documents
            .iter()
            .map(|document| document.analysis.name.clone())
            .collect::<Vec<String>>();
        names.sort();
        assert_eq!(names, vec!["blank_pages_1", "blank_pages_2"]);
    }

    fn mismatching_run_args(dir: &Path, fail_on_mismatch: bool) -> CorpusArgs {
        write_summary(dir, "blank_pages_1", &["", "a b c d e f"]);
        let truth_path = dir.join("truth").join("ground_truth.json");
        write_json_pretty(
            &truth_path,
            &GroundTruthManifest {
                manifest_version: 1,
                entries: vec![GroundTruthEntry {
                    document: "blank_pages_1.pdf".to_string(),
                    pages: Some("2".to_string()),
                }],
            },
        )
        .expect("write ground truth");

        CorpusArgs {
            summary_dir: dir.to_path_buf(),
            ground_truth: Some(truth_path),
            all_documents: false,
            max_files: -1,
            window: WindowArgs {
                min_len: 5,
                max_len: 200,
            },
            report_path: Some(dir.join("out").join("report.json")),
            fail_on_mismatch,
        }
    }

    #[test]
    fn fail_on_mismatch_errors_after_writing_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = mismatching_run_args(dir.path(), true);
        let report_path = args.report_path.clone().expect("report path");

        let error = run(args).expect_err("mismatch must fail the run");
        assert!(
            error
                .to_string()
                .contains("1 of 1 validated documents disagree with ground truth"),
            "unexpected error: {error}"
        );

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
                .expect("parse report");
        assert_eq!(report["manifest_version"], 1);
        assert_eq!(report["counts"]["mismatches"], 1);
        assert_eq!(report["counts"]["documents_validated"], 1);
        assert_eq!(report["documents"].as_array().map(Vec::len), Some(1));
        assert_eq!(report["documents"][0]["name"], "blank_pages_1");

        let mismatch = &report["mismatches"][0];
        assert_eq!(mismatch["document"], "blank_pages_1");
        assert_eq!(mismatch["expected"], serde_json::json!([1]));
        assert_eq!(mismatch["detected"], serde_json::json!([0]));
        assert_eq!(mismatch["missing"], serde_json::json!([1]));
        assert_eq!(mismatch["extra"], serde_json::json!([0]));
    }

    #[test]
    fn mismatch_without_fail_flag_still_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = mismatching_run_args(dir.path(), false);
        let report_path = args.report_path.clone().expect("report path");

        run(args).expect("mismatches are reported, not fatal");
        assert!(report_path.exists());
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = analyze_corpus(dir.path(), None, false, -1, &DetectionConfig::default())
            .expect("corpus run");
        assert_eq!(outcome.counts.documents_found, 0);
        assert!(outcome.documents.is_empty());
    }
}
