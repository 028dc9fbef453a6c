//! Reporter strategies that turn collected sentence records into artifacts.

pub mod attention;
pub mod charcut;
pub mod html;
pub mod segmenting;

use crate::record::SentenceRecord;
use crate::Result;

pub use attention::AttentionReporter;
pub use charcut::CharCutReporter;
pub use html::HtmlReport;
pub use segmenting::SegmentingReporter;

/// Default file-name prefix for report artifacts.
pub const DEFAULT_REPORT_PREFIX: &str = "report";

/// A strategy that materializes collected per-sentence data as files on
/// disk.
///
/// Implementations read only the record fields they understand and ignore
/// the rest; a missing field a reporter does not need is never an error.
/// Sentences must be reported in increasing index order — the HTML
/// reporters rewrite their full document after every sentence.
pub trait Reporter {
    /// Report one sentence. Per-sentence reporters write immediately;
    /// aggregate reporters only accumulate here.
    fn report_sentence(&mut self, idx: usize, record: &SentenceRecord) -> Result<()>;

    /// Flush at end of inference. Idempotent: a second call with nothing
    /// accumulated does nothing.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
