//! Human-inspectable reports for machine-translation inference.
//!
//! During decoding, a model accumulates one [`SentenceRecord`] per sentence in
//! a [`ReportQueue`]. At end-of-batch the inference driver merges every queue
//! into a [`ReportContext`] and feeds each merged record to the configured
//! [`Reporter`] strategies, which write the artifacts: an HTML page per run,
//! attention/feature heatmap PNGs, and a character-level hypothesis/reference
//! comparison page.
//!
//! The `mt-inspect` binary drives the same pipeline from a decoding-trace
//! file (JSON Lines, one record per line).

pub mod context;
pub mod diagnostics;
pub mod diff;
pub mod html;
pub mod plot;
pub mod record;
pub mod report;
pub mod trace;
pub mod util;

pub type Result<T> = anyhow::Result<T>;

pub use context::{ReportContext, ReportQueue};
pub use record::{Matrix, SentenceRecord, Source};
pub use report::Reporter;
