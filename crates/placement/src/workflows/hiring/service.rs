use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::domain::{
    Application, ApplicationId, AuditStamp, JobId, JobPosting, RoundStatus, StudentId,
    StudentProfile,
};
use super::eligibility::{EligibilityEngine, EligibilityReport};
use super::progress::{self, ProgressPoint};
use super::repository::{
    ApplicationStore, CampusDirectory, Notification, NotificationSink, RoundWrite, StoreError,
};
use super::transitions::{self, TransitionError, TransitionPlan};

/// Service composing the eligibility evaluator, round tracker, and bulk
/// transition engine over the document-store collaborators.
pub struct PlacementService<S, D, N> {
    applications: Arc<S>,
    directory: Arc<D>,
    notifier: Arc<N>,
    engine: EligibilityEngine,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Outcome summary returned by the bulk operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub round: String,
    pub promoted: usize,
    pub rejected: usize,
    pub skipped: Vec<ApplicationId>,
}

/// Per-application view combining the stored state with the derived
/// progression fields.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    pub current_round: Option<String>,
    pub progress_pct: f64,
    pub progress_points: Vec<ProgressPoint>,
    pub rounds: BTreeMap<String, RoundStatus>,
    pub withdrawn: bool,
    pub applied_at: DateTime<Utc>,
}

impl<S, D, N> PlacementService<S, D, N>
where
    S: ApplicationStore + 'static,
    D: CampusDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(applications: Arc<S>, directory: Arc<D>, notifier: Arc<N>) -> Self {
        Self {
            applications,
            directory,
            notifier,
            engine: EligibilityEngine::new(),
        }
    }

    /// Evaluate a student against a posting. A missing student document is
    /// substituted with an N/A placeholder so the evaluator always returns a
    /// defined answer.
    pub fn eligibility(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<EligibilityReport, PlacementServiceError> {
        let job = self.job(job_id)?;
        let student = self
            .directory
            .student(student_id)?
            .unwrap_or_else(|| StudentProfile::placeholder(student_id.clone()));
        Ok(self.engine.evaluate(&student, &job))
    }

    /// Submit one application for the student x job pair, gated on the
    /// posting's deadline and eligibility criteria.
    pub fn apply(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
        screening_answers: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<Application, PlacementServiceError> {
        let job = self.job(job_id)?;

        if let Some(deadline) = job.deadline {
            if now > deadline {
                return Err(PlacementServiceError::DeadlineClosed);
            }
        }

        if self.applications.find_pair(student_id, job_id)?.is_some() {
            return Err(PlacementServiceError::DuplicateApplication);
        }

        let student = self
            .directory
            .student(student_id)?
            .unwrap_or_else(|| StudentProfile::placeholder(student_id.clone()));
        let report = self.engine.evaluate(&student, &job);
        if !report.eligible {
            return Err(PlacementServiceError::Ineligible(report));
        }

        let mut rounds = BTreeMap::new();
        if let Some(first) = job.rounds.first() {
            rounds.insert(first.name.clone(), RoundStatus::Pending);
        }

        let application = Application {
            id: next_application_id(),
            student_id: student_id.clone(),
            job_id: job_id.clone(),
            status: Some("pending".to_string()),
            rounds,
            screening_answers,
            feedback: None,
            applied_at: now,
            audit: None,
        };

        let stored = self.applications.insert(application)?;
        self.dispatch(Notification::application_received(
            student_id.clone(),
            &job.position,
            &job.company,
        ));
        Ok(stored)
    }

    /// Student-initiated withdrawal: marks the derived current round
    /// withdrawn. Terminal; any later transition attempt is refused.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Application, PlacementServiceError> {
        let application = self.application(application_id)?;
        if application.is_withdrawn() {
            return Err(PlacementServiceError::Withdrawn);
        }

        let job = self.job(&application.job_id)?;
        let round = progress::current_round(&job, &application)
            .ok_or(PlacementServiceError::NoRoundsConfigured)?;

        let write = RoundWrite {
            application_id: application_id.clone(),
            round: round.clone(),
            status: RoundStatus::Withdrawn,
            audit: AuditStamp {
                updated_at: now,
                last_modified_by: "student".to_string(),
                previous_status: Some(application.round_status(&round)),
            },
        };
        self.applications.batch_update(std::slice::from_ref(&write))?;

        self.application(application_id)
    }

    /// Bulk shortlist for the round currently open for admin actions.
    /// Everyone in the eligible pool who is not selected is rejected.
    pub fn shortlist(
        &self,
        job_id: &JobId,
        round_name: &str,
        selected: &BTreeSet<ApplicationId>,
        pool_ids: &BTreeSet<ApplicationId>,
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome, PlacementServiceError> {
        let job = self.job(job_id)?;
        let pool = self.pool(pool_ids)?;
        let plan = transitions::plan_shortlist(&job, round_name, selected, &pool)?;
        self.apply_plan(&job, &plan, &pool, now)
    }

    /// Bulk reject for exactly the given applications in the open round.
    pub fn reject(
        &self,
        job_id: &JobId,
        round_name: &str,
        ids: &BTreeSet<ApplicationId>,
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome, PlacementServiceError> {
        let job = self.job(job_id)?;
        let pool = self.pool(ids)?;
        let plan = transitions::plan_reject(&job, round_name, ids, &pool)?;
        self.apply_plan(&job, &plan, &pool, now)
    }

    /// Single-application status write with the same audit stamp the bulk
    /// paths produce.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        round_name: &str,
        status: RoundStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Application, PlacementServiceError> {
        let application = self.application(application_id)?;
        if application.is_withdrawn() {
            return Err(PlacementServiceError::Withdrawn);
        }

        let job = self.job(&application.job_id)?;
        if job.round_index(round_name).is_none() {
            return Err(TransitionError::RoundNotFound(round_name.to_string()).into());
        }

        let write = RoundWrite {
            application_id: application_id.clone(),
            round: round_name.to_string(),
            status,
            audit: AuditStamp {
                updated_at: now,
                last_modified_by: actor.to_string(),
                previous_status: Some(application.round_status(round_name)),
            },
        };
        self.applications.batch_update(std::slice::from_ref(&write))?;

        self.dispatch(Notification::status_update(
            application.student_id.clone(),
            &job.position,
            round_name,
            status,
        ));

        self.application(application_id)
    }

    /// Advance the job's open-round pointer; display state is untouched
    /// because it derives from the round-status maps.
    pub fn complete_round(&self, job_id: &JobId) -> Result<JobPosting, PlacementServiceError> {
        Ok(self.directory.advance_round(job_id)?)
    }

    /// Applications for a job, withdrawn entries sorted to the end, newest
    /// first within each group.
    pub fn applications_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationStatusView>, PlacementServiceError> {
        let job = self.job(job_id)?;
        let mut applications = self.applications.for_job(job_id)?;
        applications.sort_by(|a, b| {
            a.is_withdrawn()
                .cmp(&b.is_withdrawn())
                .then(b.applied_at.cmp(&a.applied_at))
        });

        Ok(applications
            .iter()
            .map(|application| status_view(&job, application))
            .collect())
    }

    pub fn application_status(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationStatusView, PlacementServiceError> {
        let application = self.application(application_id)?;
        let job = self.job(&application.job_id)?;
        Ok(status_view(&job, &application))
    }

    fn apply_plan(
        &self,
        job: &JobPosting,
        plan: &TransitionPlan,
        pool: &[Application],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome, PlacementServiceError> {
        let writes = plan.writes(now, "admin", pool);
        if !writes.is_empty() {
            self.applications.batch_update(&writes)?;
        }

        // Notifications go out only after the batch has landed; refetching
        // derived state is the caller's responsibility.
        for application in pool {
            let status = if plan.promote.contains(&application.id) {
                RoundStatus::Shortlisted
            } else if plan.reject.contains(&application.id) {
                RoundStatus::Rejected
            } else {
                continue;
            };
            self.dispatch(Notification::status_update(
                application.student_id.clone(),
                &job.position,
                &plan.current_round,
                status,
            ));
        }

        Ok(BulkOutcome {
            round: plan.current_round.clone(),
            promoted: plan.promote.len(),
            rejected: plan.reject.len(),
            skipped: plan.skipped.clone(),
        })
    }

    fn pool(
        &self,
        ids: &BTreeSet<ApplicationId>,
    ) -> Result<Vec<Application>, PlacementServiceError> {
        let mut pool = Vec::with_capacity(ids.len());
        for id in ids {
            let application = self.application(id)?;
            pool.push(application);
        }
        Ok(pool)
    }

    fn job(&self, id: &JobId) -> Result<JobPosting, PlacementServiceError> {
        self.directory
            .job(id)?
            .ok_or(PlacementServiceError::JobNotFound)
    }

    fn application(&self, id: &ApplicationId) -> Result<Application, PlacementServiceError> {
        self.applications
            .fetch(id)?
            .ok_or(PlacementServiceError::ApplicationNotFound)
    }

    fn dispatch(&self, notification: Notification) {
        if let Err(error) = self.notifier.notify(notification) {
            warn!(%error, "notification dispatch failed");
        }
    }
}

fn status_view(job: &JobPosting, application: &Application) -> ApplicationStatusView {
    ApplicationStatusView {
        application_id: application.id.clone(),
        student_id: application.student_id.clone(),
        job_id: application.job_id.clone(),
        current_round: progress::current_round(job, application),
        progress_pct: progress::progress_pct(job, application),
        progress_points: progress::progress_points(job, application),
        rounds: application.rounds.clone(),
        withdrawn: application.is_withdrawn(),
        applied_at: application.applied_at,
    }
}

/// Error raised by the placement service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error("job not found")]
    JobNotFound,
    #[error("application not found")]
    ApplicationNotFound,
    #[error("the application deadline has passed")]
    DeadlineClosed,
    #[error("student has already applied for this job")]
    DuplicateApplication,
    #[error("student does not meet the eligibility criteria")]
    Ineligible(EligibilityReport),
    #[error("application has been withdrawn and cannot change status")]
    Withdrawn,
    #[error("job has no hiring rounds configured")]
    NoRoundsConfigured,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
