//! Bulk round transitions, planned as pure data before any write.
//!
//! Promotion and rejection sets are computed up front into a
//! [`TransitionPlan`] so the reject-on-promote policy is auditable and
//! testable in isolation, then the plan is lowered into one atomic batch of
//! round-key writes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Application, ApplicationId, AuditStamp, JobPosting, RoundStatus};
use super::progress;
use super::repository::RoundWrite;

/// Validation failures raised while planning a transition.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("round '{0}' is not part of this job's hiring workflow")]
    RoundNotFound(String),
    #[error("round '{requested}' is not open for bulk actions (open round: '{open}')")]
    RoundNotOpen { requested: String, open: String },
    #[error("application '{application}' has not cleared the round before '{round}'")]
    NotEligibleForRound {
        application: ApplicationId,
        round: String,
    },
    #[error("application '{0}' is not part of the eligible pool")]
    UnknownApplication(ApplicationId),
}

/// Computed promote/reject partition for one round. Everyone in the eligible
/// pool who is not promoted is rejected: there is no neutral outcome for
/// round participants once the shortlist is finalized. Withdrawn
/// applications are terminal and land in `skipped`, untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPlan {
    pub current_round: String,
    pub next_round: Option<String>,
    pub promote: Vec<ApplicationId>,
    pub reject: Vec<ApplicationId>,
    pub skipped: Vec<ApplicationId>,
}

impl TransitionPlan {
    /// Lower the plan into round-key writes for one atomic batch. Promoted
    /// applications get the current round shortlisted plus the next round
    /// seeded pending (when a next round exists) so they surface in the
    /// following stage's filtering.
    pub fn writes(&self, now: DateTime<Utc>, actor: &str, pool: &[Application]) -> Vec<RoundWrite> {
        let mut writes = Vec::new();

        for id in &self.promote {
            let previous = previous_status(pool, id, &self.current_round);
            writes.push(RoundWrite {
                application_id: id.clone(),
                round: self.current_round.clone(),
                status: RoundStatus::Shortlisted,
                audit: stamp(now, actor, previous),
            });
            if let Some(next) = &self.next_round {
                writes.push(RoundWrite {
                    application_id: id.clone(),
                    round: next.clone(),
                    status: RoundStatus::Pending,
                    audit: stamp(now, actor, None),
                });
            }
        }

        for id in &self.reject {
            let previous = previous_status(pool, id, &self.current_round);
            writes.push(RoundWrite {
                application_id: id.clone(),
                round: self.current_round.clone(),
                status: RoundStatus::Rejected,
                audit: stamp(now, actor, previous),
            });
        }

        writes
    }

    pub fn is_empty(&self) -> bool {
        self.promote.is_empty() && self.reject.is_empty()
    }
}

fn stamp(now: DateTime<Utc>, actor: &str, previous: Option<RoundStatus>) -> AuditStamp {
    AuditStamp {
        updated_at: now,
        last_modified_by: actor.to_string(),
        previous_status: previous,
    }
}

fn previous_status(
    pool: &[Application],
    id: &ApplicationId,
    round: &str,
) -> Option<RoundStatus> {
    pool.iter()
        .find(|application| &application.id == id)
        .map(|application| application.round_status(round))
}

/// Plan a shortlist for the round currently open for bulk actions: selected
/// applications advance, the rest of the eligible pool is rejected.
pub fn plan_shortlist(
    job: &JobPosting,
    round_name: &str,
    selected: &BTreeSet<ApplicationId>,
    pool: &[Application],
) -> Result<TransitionPlan, TransitionError> {
    let round_index = job
        .round_index(round_name)
        .ok_or_else(|| TransitionError::RoundNotFound(round_name.to_string()))?;
    let transition = open_transition(job, round_name)?;

    for id in selected {
        let application = pool
            .iter()
            .find(|application| &application.id == id)
            .ok_or_else(|| TransitionError::UnknownApplication(id.clone()))?;
        if !application.is_withdrawn()
            && !progress::eligible_for_round(job, application, round_index)
        {
            return Err(TransitionError::NotEligibleForRound {
                application: id.clone(),
                round: round_name.to_string(),
            });
        }
    }

    let mut plan = TransitionPlan {
        current_round: transition.current,
        next_round: transition.next,
        promote: Vec::new(),
        reject: Vec::new(),
        skipped: Vec::new(),
    };

    for application in pool {
        if application.is_withdrawn() {
            plan.skipped.push(application.id.clone());
        } else if selected.contains(&application.id) {
            plan.promote.push(application.id.clone());
        } else {
            plan.reject.push(application.id.clone());
        }
    }

    Ok(plan)
}

/// Plan a rejection for exactly the given applications; nobody else is
/// touched. Re-planning the same rejection is idempotent.
pub fn plan_reject(
    job: &JobPosting,
    round_name: &str,
    ids: &BTreeSet<ApplicationId>,
    pool: &[Application],
) -> Result<TransitionPlan, TransitionError> {
    let transition = open_transition(job, round_name)?;

    let mut plan = TransitionPlan {
        current_round: transition.current,
        next_round: transition.next,
        promote: Vec::new(),
        reject: Vec::new(),
        skipped: Vec::new(),
    };

    for id in ids {
        let application = pool
            .iter()
            .find(|application| &application.id == id)
            .ok_or_else(|| TransitionError::UnknownApplication(id.clone()))?;
        if application.is_withdrawn() {
            plan.skipped.push(id.clone());
        } else {
            plan.reject.push(id.clone());
        }
    }

    Ok(plan)
}

fn open_transition(
    job: &JobPosting,
    round_name: &str,
) -> Result<super::domain::RoundTransition, TransitionError> {
    if job.round_index(round_name).is_none() {
        return Err(TransitionError::RoundNotFound(round_name.to_string()));
    }

    let open = job
        .open_transition()
        .ok_or_else(|| TransitionError::RoundNotFound(round_name.to_string()))?;
    if open.current != round_name {
        return Err(TransitionError::RoundNotOpen {
            requested: round_name.to_string(),
            open: open.current,
        });
    }

    Ok(open)
}
