//! HTML reporter for attention matrices.

use crate::diagnostics;
use crate::html::Element;
use crate::plot;
use crate::record::{SentenceRecord, Source};
use crate::report::{html::HtmlReport, Reporter};
use crate::util;
use crate::Result;

use std::path::Path;

/// Renders each sentence's text blocks plus a heatmap of its attention
/// matrix; for speech input, a feature heatmap sits beside it.
#[derive(Debug)]
pub struct AttentionReporter {
    html: HtmlReport,
}

impl AttentionReporter {
    pub fn new(report_path: impl Into<String>) -> Self {
        Self {
            html: HtmlReport::new(report_path),
        }
    }

    fn add_atts(
        &mut self,
        idx: usize,
        record: &SentenceRecord,
        src_str: &str,
        trg_str: &str,
        desc: &str,
    ) -> Result<()> {
        let Some(attention) = &record.attention else {
            diagnostics::warn(format!("sentence {idx} has no attention matrix; skipping heatmap"));
            return Ok(());
        };
        let report_path = self.html.report_path().to_string();

        let mut feature_cell = Element::new("td");
        if let Some(features) = record.source.as_ref().and_then(Source::features) {
            let feature_file = format!("{report_path}.src_feat.{idx}.png");
            plot::plot_speech_features(features, Path::new(&feature_file), true)?;
            feature_cell.push_child(
                Element::new("img")
                    .with_attr("src", &util::basename(&feature_file))
                    .with_attr("alt", "speech features"),
            );
        }

        let attention_file = format!(
            "{report_path}.{}.{idx}.png",
            util::valid_filename(desc)?.to_lowercase()
        );
        let src_labels: Vec<&str> = src_str.split_whitespace().collect();
        let trg_labels: Vec<&str> = trg_str.split_whitespace().collect();
        plot::plot_attention(&src_labels, &trg_labels, attention, Path::new(&attention_file))?;

        let attention_cell = Element::new("td").with_child(
            Element::new("img")
                .with_attr("src", &util::basename(&attention_file))
                .with_attr("alt", "attention matrix"),
        );

        let block = Element::new("p")
            .with_child(Element::new("b").with_text(&format!("{desc}:")))
            .with_child(Element::new("br"))
            .with_child(
                Element::new("table")
                    .with_child(Element::new("tr").with_child(feature_cell).with_child(attention_cell)),
            );
        self.html.append_to_sent(block)
    }
}

impl Reporter for AttentionReporter {
    fn report_sentence(&mut self, idx: usize, record: &SentenceRecord) -> Result<()> {
        self.html.start_sent(idx)?;
        let (src_str, trg_str) = self.html.add_sent_in_out(record)?;
        self.add_atts(idx, record, &src_str, &trg_str, "Attentions")?;
        self.html.write_html_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Matrix;
    use std::fs;

    fn attention_record() -> SentenceRecord {
        SentenceRecord {
            source: Some(Source::Words(vec!["der".into(), "hund".into()])),
            output: Some("the dog".into()),
            attention: Some(
                Matrix::from_rows(vec![vec![0.9, 0.1], vec![0.2, 0.8]]).unwrap(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn writes_html_and_heatmap_per_sentence() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = AttentionReporter::new(prefix.clone());

        reporter.report_sentence(0, &attention_record()).unwrap();

        let html = fs::read_to_string(format!("{prefix}.html")).unwrap();
        assert!(html.contains("Translation Report for Sentence 0"));
        assert!(html.contains("run.attentions.0.png"));
        assert!(Path::new(&format!("{prefix}.attentions.0.png")).exists());
    }

    #[test]
    fn speech_input_gets_a_feature_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = AttentionReporter::new(prefix.clone());

        let record = SentenceRecord {
            source: Some(Source::Features(
                Matrix::from_rows(vec![vec![0.3; 8]; 20]).unwrap(),
            )),
            output: Some("spoken".into()),
            attention: Some(Matrix::from_rows(vec![vec![0.5; 1]; 20]).unwrap()),
            ..Default::default()
        };
        reporter.report_sentence(0, &record).unwrap();

        assert!(Path::new(&format!("{prefix}.src_feat.0.png")).exists());
        let html = fs::read_to_string(format!("{prefix}.html")).unwrap();
        assert!(html.contains("run.src_feat.0.png"));
        assert!(!html.contains("Source Words"));
    }

    #[test]
    fn missing_attention_still_renders_text() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = AttentionReporter::new(prefix.clone());

        let record = SentenceRecord {
            output: Some("no matrix here".into()),
            ..Default::default()
        };
        reporter.report_sentence(0, &record).unwrap();

        let html = fs::read_to_string(format!("{prefix}.html")).unwrap();
        assert!(html.contains("no matrix here"));
        assert!(!html.contains("<img"));
    }
}
