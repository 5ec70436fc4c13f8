//! BUILD_REPORT stage: assemble the idless report body, hash it, attach `RPT:<sha>`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use md_core::Params;
use md_io::hasher;

use crate::aggregate::AwardsSummary;
use crate::evaluate::MatchEvaluation;
use crate::{EngineMeta, PipelineError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    /// `RPT:<sha256>` over the canonical report body (every field below).
    pub id: String,
    pub engine: EngineMeta,
    /// Evaluation instant, RFC 3339 UTC seconds.
    pub evaluated_at: String,
    pub input_sha256: String,
    pub params: Params,
    pub matches: Vec<MatchEvaluation>,
    pub awards: AwardsSummary,
}

#[derive(Serialize)]
struct ReportNoId<'a> {
    engine: &'a EngineMeta,
    evaluated_at: &'a str,
    input_sha256: &'a str,
    params: &'a Params,
    matches: &'a [MatchEvaluation],
    awards: &'a AwardsSummary,
}

pub struct ReportInputs {
    pub engine: EngineMeta,
    pub now: DateTime<Utc>,
    pub input_sha256: String,
    pub params: Params,
    pub matches: Vec<MatchEvaluation>,
    pub awards: AwardsSummary,
}

pub fn build_report(inp: ReportInputs) -> Result<SeasonReport, PipelineError> {
    let evaluated_at = inp.now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let body = ReportNoId {
        engine: &inp.engine,
        evaluated_at: &evaluated_at,
        input_sha256: &inp.input_sha256,
        params: &inp.params,
        matches: &inp.matches,
        awards: &inp.awards,
    };
    let id = hasher::report_id(&body)?;

    Ok(SeasonReport {
        id,
        engine: inp.engine,
        evaluated_at,
        input_sha256: inp.input_sha256,
        params: inp.params,
        matches: inp.matches,
        awards: inp.awards,
    })
}

/// Recompute the id of a report and compare.
pub fn verify_report_id(r: &SeasonReport) -> Result<bool, PipelineError> {
    let body = ReportNoId {
        engine: &r.engine,
        evaluated_at: &r.evaluated_at,
        input_sha256: &r.input_sha256,
        params: &r.params,
        matches: &r.matches,
        awards: &r.awards,
    };
    Ok(hasher::report_id(&body)? == r.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn inputs() -> ReportInputs {
        ReportInputs {
            engine: crate::engine_identifiers(),
            now: Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap(),
            input_sha256: "0".repeat(64),
            params: Params::default(),
            matches: vec![],
            awards: AwardsSummary::default(),
        }
    }

    #[test]
    fn id_is_stable_and_verifiable() {
        let a = build_report(inputs()).unwrap();
        let b = build_report(inputs()).unwrap();
        assert_eq!(a.id, b.id);
        assert!(a.id.starts_with("RPT:"));
        assert_eq!(a.evaluated_at, "2025-03-02T12:00:00Z");
        assert!(verify_report_id(&a).unwrap());
    }

    #[test]
    fn id_changes_with_now() {
        let a = build_report(inputs()).unwrap();
        let mut later = inputs();
        later.now = later.now + chrono::Duration::hours(1);
        assert_ne!(a.id, build_report(later).unwrap().id);
    }

    #[test]
    fn tampering_is_detected() {
        let mut r = build_report(inputs()).unwrap();
        r.input_sha256 = "1".repeat(64);
        assert!(!verify_report_id(&r).unwrap());
    }
}
