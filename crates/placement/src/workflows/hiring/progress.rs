//! Round progression derived from an application's round-status map.
//!
//! The round-status map is the per-student ground truth for display and
//! progress; the job's global `current_round_index` is only a gate for which
//! round's bulk actions are open and never feeds a student's displayed stage.

use serde::Serialize;

use super::domain::{Application, JobPosting, RoundStatus};

/// Data for one step of the progression stepper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressPoint {
    pub round_label: String,
    pub stage_name: String,
    pub completed: bool,
}

/// Highest round index marked shortlisted, if any.
fn highest_shortlisted(job: &JobPosting, application: &Application) -> Option<usize> {
    job.rounds
        .iter()
        .enumerate()
        .filter(|(_, round)| application.round_status(&round.name) == RoundStatus::Shortlisted)
        .map(|(index, _)| index)
        .last()
}

/// Index of the round the student is actively in: one past the highest
/// shortlisted round, clamped to the last round; the first round when nothing
/// is shortlisted yet.
pub fn current_round_index(job: &JobPosting, application: &Application) -> usize {
    let last = job.rounds.len().saturating_sub(1);
    match highest_shortlisted(job, application) {
        Some(index) => (index + 1).min(last),
        None => 0,
    }
}

/// Name of the round the student is actively in; `None` for a posting with
/// no rounds configured.
pub fn current_round(job: &JobPosting, application: &Application) -> Option<String> {
    job.rounds
        .get(current_round_index(job, application))
        .map(|round| round.name.clone())
}

/// Completion percentage over the round sequence, in `[0, 100]`. A single
/// round (or none) carries no measurable progress. Monotonically
/// non-decreasing as rounds are shortlisted in order.
pub fn progress_pct(job: &JobPosting, application: &Application) -> f64 {
    let count = job.rounds.len();
    if count <= 1 {
        return 0.0;
    }

    let effective = highest_shortlisted(job, application).unwrap_or(0);
    (100.0 * effective as f64 / (count - 1) as f64).clamp(0.0, 100.0)
}

/// Stepper data for each round in order. A point is completed once the round
/// is shortlisted, or once the admin has moved the open-round pointer past it.
pub fn progress_points(job: &JobPosting, application: &Application) -> Vec<ProgressPoint> {
    job.rounds
        .iter()
        .enumerate()
        .map(|(index, round)| ProgressPoint {
            round_label: format!("R{}", index + 1),
            stage_name: round.name.clone(),
            completed: application.round_status(&round.name) == RoundStatus::Shortlisted
                || index < job.current_round_index,
        })
        .collect()
}

/// Whether the application may be acted on for the round at `index`: always
/// for the first round, otherwise only after clearing the immediately
/// preceding one. A withdrawn application is never actionable.
pub fn eligible_for_round(job: &JobPosting, application: &Application, index: usize) -> bool {
    if application.is_withdrawn() || index >= job.rounds.len() {
        return false;
    }
    if index == 0 {
        return true;
    }

    let previous = &job.rounds[index - 1];
    application.round_status(&previous.name) == RoundStatus::Shortlisted
}
