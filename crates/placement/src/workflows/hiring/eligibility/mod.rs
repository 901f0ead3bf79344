mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{JobPosting, StudentProfile};

/// Stateless evaluator deciding whether a student may apply to a posting.
/// Pure over the supplied snapshots; no side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, student: &StudentProfile, job: &JobPosting) -> EligibilityReport {
        let reasons = rules::check_criteria(student, job);
        let skill_match_pct = rules::skill_match_pct(student, job);

        EligibilityReport {
            eligible: reasons.is_empty(),
            reasons,
            skill_match_pct,
        }
    }
}

/// Aggregate verdict with one human-readable reason per failed criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub reasons: Vec<IneligibilityReason>,
    pub skill_match_pct: u8,
}

impl EligibilityReport {
    /// Rendered diagnostics for user-facing display.
    pub fn reason_lines(&self) -> Vec<String> {
        self.reasons.iter().map(|reason| reason.summary()).collect()
    }
}

/// Enumerates failed criteria so diagnostics can name the specific numeric
/// mismatch or missing skills rather than a bare "ineligible".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    CgpaBelowMinimum { student: f64, required: f64 },
    MissingSkills(Vec<String>),
    BatchMismatch { student: String, required: Vec<String> },
    GenderMismatch { student: String, required: String },
    CurrentArrearsExceeded { student: u32, max: u32 },
    HistoryArrearsExceeded { student: u32, max: u32 },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::CgpaBelowMinimum { student, required } => format!(
                "CGPA requirement not met (Your CGPA: {student}, Required: {required})"
            ),
            IneligibilityReason::MissingSkills(skills) => {
                format!("Missing skills: {}", skills.join(", "))
            }
            IneligibilityReason::BatchMismatch { student, required } => format!(
                "Batch requirement not met (Your batch: {student}, Required: {})",
                required.join(", ")
            ),
            IneligibilityReason::GenderMismatch { student, required } => format!(
                "Gender preference not met (Your gender: {student}, Required: {required})"
            ),
            IneligibilityReason::CurrentArrearsExceeded { student, max } => format!(
                "Current arrears limit exceeded (Your arrears: {student}, Maximum allowed: {max})"
            ),
            IneligibilityReason::HistoryArrearsExceeded { student, max } => format!(
                "History arrears limit exceeded (Your arrears: {student}, Maximum allowed: {max})"
            ),
        }
    }
}
