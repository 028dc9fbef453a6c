//! Record collection during decoding and the explicit collect/merge step.
//!
//! A model component pushes one record per sentence, in sentence order —
//! ordering is the only correlation key, there is no sentence-id tagging.
//! At end-of-batch the inference driver calls [`ReportQueue::merge_into`] on
//! every participating component, passing the shared context along.

use crate::diagnostics;
use crate::record::SentenceRecord;
use crate::Result;

use anyhow::bail;

/// Ordered per-sentence records for one decoding batch.
pub type ReportContext = Vec<SentenceRecord>;

/// Ordered queue of per-sentence records awaiting collection.
#[derive(Debug, Default)]
pub struct ReportQueue {
    records: Vec<SentenceRecord>,
}

impl ReportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the record for the next sentence. Must be called exactly once
    /// per sentence that will later be reported.
    pub fn push(&mut self, record: SentenceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain this queue into `context`.
    ///
    /// An empty queue leaves the context untouched, so collecting twice in a
    /// row is harmless. An empty context takes over the queued records
    /// wholesale. When both sides are nonempty their lengths must match —
    /// a mismatch is a sequencing bug, not a recoverable condition — and
    /// records merge positionally, the queued side winning on fields both
    /// define.
    pub fn merge_into(&mut self, context: &mut ReportContext) -> Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }
        if context.is_empty() {
            context.append(&mut self.records);
            return Ok(());
        }
        if context.len() != self.records.len() {
            bail!(
                "{}",
                diagnostics::error_message(format!(
                    "report context holds {} sentences but {} records were queued",
                    context.len(),
                    self.records.len()
                ))
            );
        }
        for (merged, queued) in context.iter_mut().zip(self.records.drain(..)) {
            merged.absorb(queued);
        }
        Ok(())
    }
}
