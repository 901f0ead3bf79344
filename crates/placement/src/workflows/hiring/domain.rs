use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for student profile documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for job posting documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for application documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lowercase + trim, applied once at the data boundary so criterion checks
/// never re-normalize per comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Academic and identity snapshot owned by the student. Read-only for the
/// hiring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    #[serde(rename = "rollNumber")]
    pub roll_number: String,
    pub department: String,
    pub batch: String,
    pub gender: String,
    pub cgpa: f64,
    #[serde(rename = "currentArrears")]
    pub current_arrears: u32,
    #[serde(rename = "historyArrears")]
    pub history_arrears: u32,
    pub skills: Vec<String>,
}

impl StudentProfile {
    /// Stand-in profile used when the student document is missing, so the
    /// eligibility evaluator always returns a defined answer.
    pub fn placeholder(id: StudentId) -> Self {
        Self {
            id,
            name: "N/A".to_string(),
            roll_number: "N/A".to_string(),
            department: "N/A".to_string(),
            batch: String::new(),
            gender: String::new(),
            cgpa: 0.0,
            current_arrears: 0,
            history_arrears: 0,
            skills: Vec::new(),
        }
    }
}

/// One stage of a job's hiring workflow. Insertion order in
/// `JobPosting::rounds` defines progression order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringRound {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Screening question attached to a posting; answers are collected at apply
/// time keyed by stringified question index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    Choice,
    YesNo,
}

/// Admin-owned posting with eligibility thresholds and the ordered hiring
/// workflow.
///
/// The arrears and CGPA thresholds are `Option`s: `None` means no rule is
/// configured and the criterion auto-passes. The legacy documents encode
/// "no limit" as a literal `0`, which the deserializers map to `None`, so a
/// stored zero keeps its original meaning while the in-memory model can
/// still express zero tolerance as `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub company: String,
    pub position: String,
    #[serde(
        rename = "minCGPA",
        default,
        deserialize_with = "zero_means_unset_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_cgpa: Option<f64>,
    #[serde(
        rename = "maxCurrentArrears",
        default,
        deserialize_with = "zero_means_unset_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_current_arrears: Option<u32>,
    #[serde(
        rename = "maxHistoryArrears",
        default,
        deserialize_with = "zero_means_unset_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_history_arrears: Option<u32>,
    #[serde(rename = "genderPreference", default = "default_gender_preference")]
    pub gender_preference: String,
    #[serde(rename = "eligibleBatch", default)]
    pub eligible_batch: Vec<String>,
    #[serde(rename = "eligibleDepartments", default)]
    pub eligible_departments: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<HiringRound>,
    #[serde(rename = "screeningQuestions", default)]
    pub screening_questions: Vec<ScreeningQuestion>,
    #[serde(rename = "currentRoundIndex", default)]
    pub current_round_index: usize,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

fn default_gender_preference() -> String {
    "Any".to_string()
}

fn zero_means_unset_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|value| *value > 0.0))
}

fn zero_means_unset_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<u32>::deserialize(deserializer)?;
    Ok(raw.filter(|value| *value > 0))
}

impl JobPosting {
    pub fn round_index(&self, round_name: &str) -> Option<usize> {
        self.rounds.iter().position(|round| round.name == round_name)
    }

    /// Transition rooted at the given round index; the terminal round has no
    /// `next` (finalize semantics instead of advance).
    pub fn transition_at(&self, index: usize) -> Option<RoundTransition> {
        let current = self.rounds.get(index)?;
        Some(RoundTransition {
            current: current.name.clone(),
            next: self.rounds.get(index + 1).map(|round| round.name.clone()),
        })
    }

    /// The transition whose bulk-action panel is currently open. The global
    /// round pointer only gates bulk operations; per-application display is
    /// derived from the round-status map.
    pub fn open_transition(&self) -> Option<RoundTransition> {
        self.transition_at(self.current_round_index)
    }

    pub fn transitions(&self) -> Vec<RoundTransition> {
        (0..self.rounds.len())
            .filter_map(|index| self.transition_at(index))
            .collect()
    }
}

/// Derived pair of consecutive round names; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTransition {
    pub current: String,
    pub next: Option<String>,
}

/// Per-round outcome recorded on an application. A round with no entry in the
/// map reads as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    Shortlisted,
    Rejected,
    Withdrawn,
}

impl RoundStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Shortlisted => "shortlisted",
            RoundStatus::Rejected => "rejected",
            RoundStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Audit metadata stamped on every status-changing write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "lastModifiedBy")]
    pub last_modified_by: String,
    #[serde(
        rename = "previousStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_status: Option<RoundStatus>,
}

/// Join entity linking one student to one job. One application per
/// student x job pair, enforced at write time because the document store
/// does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    /// Legacy single-value pipeline status; superseded by the round map and
    /// kept only for documents written before rounds existed.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rounds: BTreeMap<String, RoundStatus>,
    #[serde(default)]
    pub screening_answers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditStamp>,
}

impl Application {
    /// Status for a round name; a round not yet reached has no key and reads
    /// as pending.
    pub fn round_status(&self, round_name: &str) -> RoundStatus {
        self.rounds
            .get(round_name)
            .copied()
            .unwrap_or(RoundStatus::Pending)
    }

    /// Withdrawal is terminal for the whole application, not just the round
    /// it was recorded against.
    pub fn is_withdrawn(&self) -> bool {
        self.rounds
            .values()
            .any(|status| *status == RoundStatus::Withdrawn)
    }
}
