//! Decoding-trace parsing (JSON Lines, one sentence record per line).

use crate::context::ReportContext;
use crate::diagnostics;
use crate::record::SentenceRecord;
use crate::Result;

use anyhow::{bail, Context};
use std::fs;

/// Parse a decoding trace into an ordered report context.
///
/// One JSON object per line, in sentence order. Blank lines are skipped;
/// unknown fields inside a record are ignored. Any line that fails to parse
/// aborts with its 1-based line number.
///
/// Example line:
/// {"source": {"words": ["der", "hund"]}, "output": "the dog", "attention": [[0.9, 0.1], [0.2, 0.8]]}
pub fn parse_trace_file(path: &str) -> Result<ReportContext> {
    let text = fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read trace file {}", path)))?;

    let mut out = ReportContext::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: SentenceRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "trace parse error at {}:{}: {}",
                        path, lno, err
                    ))
                );
            }
        };
        out.push(record);
    }

    Ok(out)
}

/// Read a line-per-sentence text file (e.g. reference translations).
pub fn read_lines_file(path: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read sentence file {}", path)))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let file = write_temp(
            "{\"output\": \"the dog\"}\n\
             \n\
             {\"output\": \"a cat\", \"reference\": \"the cat\"}\n",
        );
        let context = parse_trace_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[1].reference.as_deref(), Some("the cat"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let file = write_temp("{\"output\": \"x\", \"decode_time_ms\": 17}\n");
        let context = parse_trace_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let file = write_temp("{\"output\": \"ok\"}\n{not json}\n");
        let err = parse_trace_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(":2"));
    }

    #[test]
    fn attention_parses_as_matrix() {
        let file = write_temp(
            "{\"source\": {\"words\": [\"a\", \"b\"]}, \"output\": \"x y\", \
              \"attention\": [[0.9, 0.1], [0.2, 0.8]]}\n",
        );
        let context = parse_trace_file(file.path().to_str().unwrap()).unwrap();
        let attention = context[0].attention.as_ref().unwrap();
        assert_eq!((attention.rows(), attention.cols()), (2, 2));
    }
}
