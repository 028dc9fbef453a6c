//! Aggregate reporter producing a character-level comparison page.

use crate::diagnostics;
use crate::diff::{self, DiffOptions, DiffRow};
use crate::record::{SentenceRecord, Source};
use crate::report::Reporter;
use crate::util;
use crate::Result;

use std::path::Path;

/// Accumulates hypothesis/reference/source strings for the whole run and
/// writes the comparison artifacts once, at end of inference.
#[derive(Debug)]
pub struct CharCutReporter {
    report_path: String,
    opts: DiffOptions,
    hyp_sents: Vec<String>,
    ref_sents: Vec<String>,
    src_sents: Vec<Option<String>>,
}

impl CharCutReporter {
    pub fn new(report_path: impl Into<String>, match_size: usize, alt_norm: bool) -> Self {
        Self {
            report_path: report_path.into(),
            opts: DiffOptions { match_size, alt_norm },
            hyp_sents: Vec::new(),
            ref_sents: Vec::new(),
            src_sents: Vec::new(),
        }
    }

    pub fn with_defaults(report_path: impl Into<String>) -> Self {
        let opts = DiffOptions::default();
        Self::new(report_path, opts.match_size, opts.alt_norm)
    }
}

impl Reporter for CharCutReporter {
    fn report_sentence(&mut self, idx: usize, record: &SentenceRecord) -> Result<()> {
        let hyp = match &record.output {
            Some(output) => output.clone(),
            None => {
                diagnostics::warn(format!("sentence {idx} has no output; comparing empty string"));
                String::new()
            }
        };
        let reference = match &record.reference {
            Some(reference) => reference.clone(),
            None => {
                diagnostics::warn(format!(
                    "sentence {idx} has no reference; comparing against empty string"
                ));
                String::new()
            }
        };
        let source = match &record.source {
            Some(Source::Words(words)) => Some(words.join(" ")),
            _ => None,
        };

        self.hyp_sents.push(hyp);
        self.ref_sents.push(reference);
        self.src_sents.push(source);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.hyp_sents.is_empty() {
            return Ok(());
        }

        let hyp_file = format!("{}.charcut.tmp_c", self.report_path);
        let ref_file = format!("{}.charcut.tmp_r", self.report_path);
        let src_file = format!("{}.charcut.tmp_s", self.report_path);
        let html_file = format!("{}.charcut.html", self.report_path);

        util::write_lines(Path::new(&hyp_file), &self.hyp_sents)?;
        util::write_lines(Path::new(&ref_file), &self.ref_sents)?;
        if self.src_sents.iter().any(Option::is_some) {
            let lines: Vec<String> = self
                .src_sents
                .iter()
                .map(|source| source.clone().unwrap_or_default())
                .collect();
            util::write_lines(Path::new(&src_file), &lines)?;
        }

        let rows: Vec<DiffRow> = self
            .hyp_sents
            .drain(..)
            .zip(self.ref_sents.drain(..))
            .zip(self.src_sents.drain(..))
            .map(|((candidate, reference), source)| DiffRow {
                source,
                candidate,
                reference,
            })
            .collect();
        diff::write_html_report(Path::new(&html_file), &rows, &self.opts)?;
        diagnostics::info(format!("Wrote {}", html_file));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(output: &str, reference: &str, source: Option<&str>) -> SentenceRecord {
        SentenceRecord {
            source: source.map(|s| {
                Source::Words(s.split_whitespace().map(str::to_string).collect())
            }),
            output: Some(output.to_string()),
            reference: Some(reference.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn nothing_accumulated_writes_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = CharCutReporter::with_defaults(prefix.clone());

        reporter.finish().unwrap();

        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn finish_writes_line_files_and_page() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = CharCutReporter::with_defaults(prefix.clone());

        reporter
            .report_sentence(0, &record("the dog", "the dog", Some("der hund")))
            .unwrap();
        reporter
            .report_sentence(1, &record("a cat", "the cat", Some("die katze")))
            .unwrap();
        reporter.finish().unwrap();

        let hyps = fs::read_to_string(format!("{prefix}.charcut.tmp_c")).unwrap();
        assert_eq!(hyps, "the dog\na cat\n");
        let refs = fs::read_to_string(format!("{prefix}.charcut.tmp_r")).unwrap();
        assert_eq!(refs, "the dog\nthe cat\n");
        let srcs = fs::read_to_string(format!("{prefix}.charcut.tmp_s")).unwrap();
        assert_eq!(srcs, "der hund\ndie katze\n");
        assert!(fs::read_to_string(format!("{prefix}.charcut.html"))
            .unwrap()
            .contains("2 sentences"));
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = CharCutReporter::with_defaults(prefix.clone());

        reporter
            .report_sentence(0, &record("x", "x", None))
            .unwrap();
        reporter.finish().unwrap();

        // Everything was flushed; a second finish touches nothing.
        fs::remove_file(format!("{prefix}.charcut.html")).unwrap();
        reporter.finish().unwrap();
        assert!(!Path::new(&format!("{prefix}.charcut.html")).exists());
    }

    #[test]
    fn speech_sources_produce_no_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = CharCutReporter::with_defaults(prefix.clone());

        let mut rec = record("spoken", "spoken", None);
        rec.source = Some(Source::Features(
            crate::record::Matrix::from_rows(vec![vec![0.1, 0.2]]).unwrap(),
        ));
        reporter.report_sentence(0, &rec).unwrap();
        reporter.finish().unwrap();

        assert!(!Path::new(&format!("{prefix}.charcut.tmp_s")).exists());
        assert!(Path::new(&format!("{prefix}.charcut.tmp_c")).exists());
    }
}
