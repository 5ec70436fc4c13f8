// crates/md_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, the validate-only
// short-circuit, and the single evaluation run (load → pipeline → report).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::io::Write;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};

use md_io::{canonical_json, loader};
use md_pipeline::PipelineError;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bundle shape, params domain, JSON syntax.
    Validation(String),
    /// Read/write/path errors, report build failures.
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("md: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    init_logging(args.quiet);

    let result = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match result {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("md: error: {e}");
            map_error(&e)
        }
    };

    ExitCode::from(rc as u8)
}

/// Logs go to stderr; stdout carries only the report. RUST_LOG overrides the default level.
fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

/// Load and validate the bundle; nothing is evaluated or written.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let bundle = loader::load_bundle(&args.input, &args.overrides()).map_err(map_io_err)?;
    tracing::info!(matches = bundle.matches.len(), "bundle OK");
    if !args.quiet {
        eprintln!("validate-only: {} matches OK", bundle.matches.len());
    }
    Ok(())
}

/// One evaluation at a single instant. The clock is read at most once, here.
fn run_once(args: &Args) -> Result<(), MainError> {
    let now = args.now_or_wall_clock();
    tracing::debug!(input = %args.input.display(), %now, "evaluating");

    let report = md_pipeline::run_from_path(&args.input, &args.overrides(), now).map_err(map_pipeline_err)?;

    match &args.out {
        Some(path) => {
            canonical_json::write_canonical_file(path, &report).map_err(map_io_err)?;
            if !args.quiet {
                eprintln!("wrote {} ({})", path.display(), report.id);
            }
        }
        None => {
            let bytes = canonical_json::to_canonical_bytes(&report).map_err(map_io_err)?;
            let mut out = std::io::stdout().lock();
            out.write_all(&bytes)
                .and_then(|_| out.write_all(b"\n"))
                .and_then(|_| out.flush())
                .map_err(|e| MainError::Io(format!("stdout: {e}")))?;
        }
    }
    Ok(())
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn map_io_err(e: md_io::IoError) -> MainError {
    map_pipeline_err(e.into())
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Schema(m) | PipelineError::Validate(m) => MainError::Validation(m),
        PipelineError::Io(m) | PipelineError::Build(m) => MainError::Io(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_buckets_map_to_exit_codes() {
        assert_eq!(map_error(&map_io_err(md_io::IoError::Bundle("x".into()))), exitcodes::VALIDATION);
        assert_eq!(
            map_error(&map_io_err(md_io::IoError::Json { pointer: "/".into(), msg: "eof".into() })),
            exitcodes::VALIDATION
        );
        assert_eq!(map_error(&map_io_err(md_io::IoError::Path("denied".into()))), exitcodes::IO);
        assert_eq!(map_error(&map_pipeline_err(PipelineError::Build("hash".into()))), exitcodes::IO);
    }
}
