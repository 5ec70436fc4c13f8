//! md_pipeline: deterministic pipeline surface (load → evaluate → award → aggregate → report).
//! This crate performs no I/O of its own beyond delegating bundle loading to `md_io`;
//! decisions come from `md_algo`. `now` is always supplied by the caller.

use core::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use md_core::ParamsOverride;
use md_io::loader::{self, SeasonBundle};

pub mod aggregate;
pub mod award;
pub mod evaluate;
pub mod report;

pub use aggregate::{aggregate, AwardsSummary};
pub use award::{decide_award, AwardDecision};
pub use evaluate::{evaluate_match, MatchEvaluation, OutcomeView, TallySummary};
pub use report::{build_report, verify_report_id, SeasonReport};

/// Engine identifiers echoed in every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

/// Pipeline context: the bundle is already loaded and validated by md_io.
#[derive(Debug)]
pub struct PipelineCtx {
    pub bundle: SeasonBundle,
    pub now: DateTime<Utc>,
    pub engine_meta: EngineMeta,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug)]
pub enum PipelineError {
    Io(String),
    Schema(String),
    Validate(String),
    Build(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Schema(m) => write!(f, "schema: {m}"),
            PipelineError::Validate(m) => write!(f, "validate: {m}"),
            PipelineError::Build(m) => write!(f, "build: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<md_io::IoError> for PipelineError {
    fn from(e: md_io::IoError) -> Self {
        use md_io::IoError as E;
        match e {
            E::Json { pointer, msg } => PipelineError::Schema(format!("json {pointer}: {msg}")),
            E::Bundle(m) => PipelineError::Validate(format!("bundle: {m}")),
            E::Params(m) => PipelineError::Validate(format!("params: {m}")),
            E::Hash(m) => PipelineError::Build(format!("hash: {m}")),
            E::Path(m) => PipelineError::Io(format!("path: {m}")),
        }
    }
}

// -------------------------------------- Public API --------------------------------------

/// Evaluate every match of a loaded bundle at `ctx.now` and build the report.
pub fn run_with_ctx(ctx: PipelineCtx) -> Result<SeasonReport, PipelineError> {
    let SeasonBundle { params, matches, input_sha256 } = ctx.bundle;

    let evals: Vec<MatchEvaluation> =
        matches.iter().map(|m| evaluate_match(m, &params, ctx.now)).collect();
    let awards = aggregate(&evals);

    tracing::info!(
        matches = evals.len(),
        counted = awards.counted_matches,
        skipped = awards.skipped_matches,
        manual_pending = awards.manual_pending.len(),
        "season evaluated"
    );

    build_report(report::ReportInputs {
        engine: ctx.engine_meta,
        now: ctx.now,
        input_sha256,
        params,
        matches: evals,
        awards,
    })
}

/// Convenience entry: load a bundle from a local path, then run.
pub fn run_from_path<P: AsRef<Path>>(
    path: P,
    overrides: &ParamsOverride,
    now: DateTime<Utc>,
) -> Result<SeasonReport, PipelineError> {
    let bundle = loader::load_bundle(path.as_ref(), overrides)?;
    run_with_ctx(PipelineCtx { bundle, now, engine_meta: engine_identifiers() })
}

/// Engine identifiers for reports.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: "md_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
