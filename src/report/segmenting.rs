//! HTML reporter for segmentation decisions.

use crate::diagnostics;
use crate::html::Element;
use crate::record::SentenceRecord;
use crate::report::{html::HtmlReport, Reporter};
use crate::Result;

use anyhow::bail;

/// Renders each sentence's text blocks plus a human-readable overlay of the
/// segmenter's per-token decisions.
#[derive(Debug)]
pub struct SegmentingReporter {
    html: HtmlReport,
}

impl SegmentingReporter {
    pub fn new(report_path: impl Into<String>) -> Self {
        Self {
            html: HtmlReport::new(report_path),
        }
    }
}

/// Re-derive segments from per-token decisions, aligned 1:1 with `words`.
///
/// Decision semantics: `0` keeps accumulating the pending segment, `1`
/// appends the token and emits the pending segment, anything else emits the
/// pending segment (if any) and then the token itself as a deleted segment.
/// A trailing pending segment is flushed as non-deleted.
pub fn apply_segmentation(words: &[&str], decisions: &[u32]) -> Result<Vec<(String, bool)>> {
    if words.len() != decisions.len() {
        bail!(
            "{}",
            diagnostics::error_message(format!(
                "{} segmentation decisions for {} source words",
                decisions.len(),
                words.len()
            ))
        );
    }

    let mut segments = Vec::new();
    let mut pending = String::new();
    for (&decision, &word) in decisions.iter().zip(words) {
        match decision {
            0 => pending.push_str(word),
            1 => {
                pending.push_str(word);
                segments.push((std::mem::take(&mut pending), false));
            }
            _ => {
                if !pending.is_empty() {
                    segments.push((std::mem::take(&mut pending), false));
                }
                segments.push((word.to_string(), true));
            }
        }
    }
    if !pending.is_empty() {
        segments.push((pending, false));
    }
    Ok(segments)
}

impl Reporter for SegmentingReporter {
    fn report_sentence(&mut self, idx: usize, record: &SentenceRecord) -> Result<()> {
        self.html.start_sent(idx)?;
        let (src_str, _trg_str) = self.html.add_sent_in_out(record)?;

        if let Some(decisions) = &record.segmentation {
            let words: Vec<&str> = src_str.split_whitespace().collect();
            let segments = apply_segmentation(&words, decisions)?;
            if !segments.is_empty() {
                let mut overlay = Element::new("p");
                overlay.push_text("Segmentation: ");
                for (i, (text, deleted)) in segments.iter().enumerate() {
                    if i > 0 {
                        overlay.push_text(", ");
                    }
                    if *deleted {
                        overlay.push_child(
                            Element::new("span")
                                .with_attr("style", "color: red")
                                .with_child(Element::new("del").with_text(text)),
                        );
                    } else {
                        overlay.push_text(text);
                    }
                }
                // Right after the text blocks, before anything appended later.
                self.html.insert_in_sent(2, overlay)?;
            }
        } else {
            diagnostics::warn(format!("sentence {idx} has no segmentation decisions"));
        }

        self.html.write_html_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Source;
    use std::fs;

    #[test]
    fn segment_then_delete() {
        let segments = apply_segmentation(&["ab", "cd", "ef"], &[0, 1, 2]).unwrap();
        assert_eq!(
            segments,
            vec![("abcd".to_string(), false), ("ef".to_string(), true)]
        );
    }

    #[test]
    fn trailing_pending_segment_is_flushed() {
        let segments = apply_segmentation(&["a", "b"], &[0, 0]).unwrap();
        assert_eq!(segments, vec![("ab".to_string(), false)]);
    }

    #[test]
    fn delete_flushes_pending_first() {
        let segments = apply_segmentation(&["a", "b", "c"], &[0, 2, 1]).unwrap();
        assert_eq!(
            segments,
            vec![
                ("a".to_string(), false),
                ("b".to_string(), true),
                ("c".to_string(), false),
            ]
        );
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(apply_segmentation(&["a", "b"], &[0]).is_err());
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(apply_segmentation(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn overlay_sits_after_the_text_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().into_owned();
        let mut reporter = SegmentingReporter::new(prefix.clone());

        let record = SentenceRecord {
            source: Some(Source::Words(vec!["ab".into(), "cd".into(), "ef".into()])),
            output: Some("x y".into()),
            segmentation: Some(vec![0, 1, 2]),
            ..Default::default()
        };
        reporter.report_sentence(0, &record).unwrap();

        let html = fs::read_to_string(format!("{prefix}.html")).unwrap();
        assert!(html.contains("Segmentation: "));
        assert!(html.contains("abcd"));
        assert!(html.contains("<del>ef</del>"));
        // The overlay comes after the source and output blocks.
        let seg_pos = html.find("Segmentation: ").unwrap();
        let out_pos = html.find("Output Words").unwrap();
        assert!(out_pos < seg_pos);
    }
}
