use clap::{Parser, Subcommand, ValueEnum};

use mt_inspect::context::ReportQueue;
use mt_inspect::diagnostics;
use mt_inspect::record::SentenceRecord;
use mt_inspect::report::{
    AttentionReporter, CharCutReporter, Reporter, SegmentingReporter, DEFAULT_REPORT_PREFIX,
};
use mt_inspect::trace;

#[derive(Parser)]
#[command(name = "mt-inspect")]
#[command(about = "Inference report generator for machine-translation output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render reports from a decoding trace (validates inputs while running).
    Report {
        /// Decoding trace, one JSON sentence record per line.
        #[arg(long)]
        trace: String,

        /// Reference translations, one sentence per line, merged into the
        /// trace records.
        #[arg(long)]
        reference: Option<String>,

        /// Prefix for report artifacts (HTML page, images, text files).
        #[arg(short = 'o', long, default_value = DEFAULT_REPORT_PREFIX)]
        out: String,

        /// Reporters to run; repeat for several.
        #[arg(long = "reporter", value_enum)]
        reporters: Vec<ReporterKind>,

        /// Minimum character match size for the charcut comparison.
        #[arg(long, default_value_t = 3)]
        match_size: usize,

        /// Normalize charcut scores by candidate length only.
        #[arg(long)]
        alt_norm: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ReporterKind {
    Attention,
    Segmentation,
    Charcut,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report {
            trace,
            reference,
            out,
            reporters,
            match_size,
            alt_norm,
        } => {
            // 1) Parse + validate the decoding trace.
            let mut context = trace::parse_trace_file(&trace)?;

            // 2) Merge reference translations through the collect path.
            if let Some(reference_path) = reference {
                let mut queue = ReportQueue::new();
                for line in trace::read_lines_file(&reference_path)? {
                    queue.push(SentenceRecord {
                        reference: Some(line),
                        ..Default::default()
                    });
                }
                queue.merge_into(&mut context)?;
            }

            // 3) Run every selected reporter over every sentence, in order.
            let mut kinds: Vec<ReporterKind> = Vec::new();
            for kind in reporters {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            if kinds.is_empty() {
                kinds.push(ReporterKind::Attention);
            }

            // Both HTML reporters own a document; keep their files apart
            // when they run together.
            let both_html = kinds.contains(&ReporterKind::Attention)
                && kinds.contains(&ReporterKind::Segmentation);

            let mut active: Vec<Box<dyn Reporter>> = Vec::with_capacity(kinds.len());
            for kind in &kinds {
                let reporter: Box<dyn Reporter> = match kind {
                    ReporterKind::Attention => Box::new(AttentionReporter::new(out.as_str())),
                    ReporterKind::Segmentation => {
                        let prefix = if both_html {
                            format!("{out}.seg")
                        } else {
                            out.clone()
                        };
                        Box::new(SegmentingReporter::new(prefix))
                    }
                    ReporterKind::Charcut => {
                        Box::new(CharCutReporter::new(out.as_str(), match_size, alt_norm))
                    }
                };
                active.push(reporter);
            }

            for (idx, record) in context.iter().enumerate() {
                for reporter in active.iter_mut() {
                    reporter.report_sentence(idx, record)?;
                }
            }

            // 4) Flush the aggregate reporters.
            for reporter in active.iter_mut() {
                reporter.finish()?;
            }

            diagnostics::info(format!("Reported {} sentences to {}.*", context.len(), out));
        }
    }

    Ok(())
}
