// crates/md_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing.
// - No networked paths (reject any scheme:// like http/https/file)
// - --input is required and must be a local file
// - --now is RFC 3339; defaults to the wall clock, read once here
// - --validate-only loads the bundle without evaluating

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use clap::Parser;

use md_core::ParamsOverride;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "md",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic match outcome and award resolution"
)]
pub struct Args {
    /// Season bundle JSON path.
    #[arg(long)]
    pub input: PathBuf,

    /// Evaluation instant (RFC 3339). Defaults to the current time.
    #[arg(long, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// Write the canonical report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Override params.vote_window_hours.
    #[arg(long)]
    pub vote_hours: Option<u32>,

    /// Override params.announce_window_hours.
    #[arg(long)]
    pub announce_hours: Option<u32>,

    /// Override params.manual_gate_delay_hours.
    #[arg(long)]
    pub gate_hours: Option<u32>,

    /// Override params.utc_offset_minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Load and validate the bundle only; do not evaluate.
    #[arg(long)]
    pub validate_only: bool,

    /// Only log errors.
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    pub fn overrides(&self) -> ParamsOverride {
        ParamsOverride {
            vote_window_hours: self.vote_hours,
            announce_window_hours: self.announce_hours,
            manual_gate_delay_hours: self.gate_hours,
            utc_offset_minutes: self.utc_offset,
        }
    }

    /// `--now`, or the wall clock.
    pub fn now_or_wall_clock(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// Errors surfaced by argument validation.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// RFC 3339 instant, normalized to UTC.
pub fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort absolute path; falls back to CWD-relative when the path does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

fn validate(mut args: Args) -> Result<Args, CliError> {
    if let Some(out) = &args.out {
        ensure_local_path(out)?;
    }
    ensure_local_exists(&args.input, "--input")?;

    args.input = normalize_path(&args.input);
    args.out = args.out.take().map(|p| normalize_path(&p));
    Ok(args)
}
