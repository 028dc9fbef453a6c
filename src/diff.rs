//! Character-level hypothesis/reference comparison.
//!
//! Aligns each candidate sentence against its reference, demotes "equal"
//! runs shorter than the configured match size (coincidental character
//! overlap, not real matches), scores the edit cost, and renders one
//! self-contained HTML comparison page for the whole run.

use crate::html::escape_text;
use crate::util;
use crate::Result;

use anyhow::Context;
use dissimilar::Chunk;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Minimum character run length considered a match. Tune down for
    /// scripts without whitespace-delimited words.
    pub match_size: usize,
    /// Normalize the edit cost by the candidate length alone instead of the
    /// combined candidate and reference lengths.
    pub alt_norm: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            match_size: 3,
            alt_norm: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Present in both candidate and reference.
    Match(String),
    /// Present only in the candidate.
    Insert(String),
    /// Present only in the reference.
    Delete(String),
}

/// One sentence of the comparison page.
#[derive(Debug, Clone)]
pub struct DiffRow {
    pub source: Option<String>,
    pub candidate: String,
    pub reference: String,
}

/// Character-align `candidate` against `reference`.
///
/// Equal runs shorter than `match_size` characters are demoted to a
/// deletion plus an insertion of the same text.
pub fn align(candidate: &str, reference: &str, match_size: usize) -> Vec<EditOp> {
    let mut ops: Vec<EditOp> = Vec::new();
    for chunk in dissimilar::diff(reference, candidate) {
        match chunk {
            Chunk::Equal(text) => {
                if text.chars().count() < match_size {
                    push_op(&mut ops, EditOp::Delete(text.to_string()));
                    push_op(&mut ops, EditOp::Insert(text.to_string()));
                } else {
                    push_op(&mut ops, EditOp::Match(text.to_string()));
                }
            }
            Chunk::Delete(text) => push_op(&mut ops, EditOp::Delete(text.to_string())),
            Chunk::Insert(text) => push_op(&mut ops, EditOp::Insert(text.to_string())),
        }
    }
    ops
}

/// Merge runs of the same kind as they are appended.
fn push_op(ops: &mut Vec<EditOp>, op: EditOp) {
    match (ops.last_mut(), &op) {
        (Some(EditOp::Match(acc)), EditOp::Match(text))
        | (Some(EditOp::Insert(acc)), EditOp::Insert(text))
        | (Some(EditOp::Delete(acc)), EditOp::Delete(text)) => acc.push_str(text),
        _ => ops.push(op),
    }
}

/// Normalized edit cost in [0, 1]: inserted plus deleted characters over the
/// combined sentence lengths (or twice the candidate length with
/// `alt_norm`). Two empty sentences score 0.
pub fn score(ops: &[EditOp], candidate: &str, reference: &str, alt_norm: bool) -> f64 {
    let cost: usize = ops
        .iter()
        .map(|op| match op {
            EditOp::Match(_) => 0,
            EditOp::Insert(text) | EditOp::Delete(text) => text.chars().count(),
        })
        .sum();
    let norm = if alt_norm {
        2 * candidate.chars().count()
    } else {
        candidate.chars().count() + reference.chars().count()
    };
    if norm == 0 {
        return 0.0;
    }
    (cost as f64 / norm as f64).min(1.0)
}

/// The candidate with insertions highlighted.
pub fn candidate_html(ops: &[EditOp]) -> String {
    let mut out = String::new();
    for op in ops {
        match op {
            EditOp::Match(text) => out.push_str(&escape_text(text)),
            EditOp::Insert(text) => {
                let _ = write!(out, r#"<span class="ins">{}</span>"#, escape_text(text));
            }
            EditOp::Delete(_) => {}
        }
    }
    out
}

/// The reference with deletions highlighted.
pub fn reference_html(ops: &[EditOp]) -> String {
    let mut out = String::new();
    for op in ops {
        match op {
            EditOp::Match(text) => out.push_str(&escape_text(text)),
            EditOp::Delete(text) => {
                let _ = write!(out, r#"<span class="del">{}</span>"#, escape_text(text));
            }
            EditOp::Insert(_) => {}
        }
    }
    out
}

const PAGE_CSS: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 20px; color: #222; }\n\
h1 { font-size: 22px; margin: 0 0 4px 0; }\n\
.summary { color: #555; font-size: 14px; margin-bottom: 18px; }\n\
.sent { border-top: 1px solid #ddd; padding: 10px 0; }\n\
.sent h2 { font-size: 15px; margin: 0 0 6px 0; color: #444; }\n\
.row { margin: 2px 0; }\n\
.row b { display: inline-block; width: 90px; color: #666; font-weight: normal; }\n\
.ins { background: #cfc; }\n\
.del { background: #fcc; text-decoration: line-through; }\n\
.score { color: #888; font-size: 13px; }\n";

/// Write the comparison page for a whole run to `path`.
pub fn write_html_report(path: &Path, rows: &[DiffRow], opts: &DiffOptions) -> Result<()> {
    let mut scores = Vec::with_capacity(rows.len());
    let mut body = String::new();

    for (i, row) in rows.iter().enumerate() {
        let ops = align(&row.candidate, &row.reference, opts.match_size);
        let sent_score = score(&ops, &row.candidate, &row.reference, opts.alt_norm);
        scores.push(sent_score);

        writeln!(body, r#"<div class="sent">"#)?;
        writeln!(body, "<h2>Sentence {}</h2>", i)?;
        if let Some(source) = &row.source {
            writeln!(
                body,
                r#"<div class="row"><b>source</b>{}</div>"#,
                escape_text(source)
            )?;
        }
        writeln!(
            body,
            r#"<div class="row"><b>candidate</b>{}</div>"#,
            candidate_html(&ops)
        )?;
        writeln!(
            body,
            r#"<div class="row"><b>reference</b>{}</div>"#,
            reference_html(&ops)
        )?;
        writeln!(body, r#"<div class="score">score {:.3}</div>"#, sent_score)?;
        writeln!(body, "</div>")?;
    }

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let mut page = String::new();
    writeln!(page, "<!doctype html>")?;
    writeln!(page, "<html>")?;
    writeln!(page, "<head>")?;
    writeln!(page, r#"<meta charset="UTF-8">"#)?;
    writeln!(page, "<title>Character Comparison</title>")?;
    writeln!(page, "<style>\n{}</style>", PAGE_CSS)?;
    writeln!(page, "</head>")?;
    writeln!(page, "<body>")?;
    writeln!(page, "<h1>Character Comparison</h1>")?;
    writeln!(
        page,
        r#"<div class="summary">{} sentences, mean score {:.3}</div>"#,
        rows.len(),
        mean
    )?;
    page.push_str(&body);
    writeln!(page, "</body>")?;
    writeln!(page, "</html>")?;

    util::make_parent_dir(path)?;
    fs::write(path, page).with_context(|| format!("write comparison page {}", path.display()))?;
    Ok(())
}
