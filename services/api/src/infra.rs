use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use placement::workflows::hiring::{
    Application, ApplicationId, ApplicationStore, CampusDirectory, JobId, JobPosting,
    Notification, NotificationSink, NotifyError, RoundWrite, StoreError, StudentId,
    StudentProfile,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the applications collection. Batched round
/// writes are validated in full before any record is touched, matching the
/// all-or-nothing contract of the document store.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationStore for InMemoryApplicationStore {
    fn insert(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_pair(
        &self,
        student: &StudentId,
        job: &JobId,
    ) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .find(|application| &application.student_id == student && &application.job_id == job)
            .cloned())
    }

    fn for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.job_id == job)
            .cloned()
            .collect())
    }

    fn batch_update(&self, writes: &[RoundWrite]) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        for write in writes {
            if !guard.contains_key(&write.application_id) {
                return Err(StoreError::NotFound);
            }
        }
        for write in writes {
            let application = guard
                .get_mut(&write.application_id)
                .expect("validated above");
            application.rounds.insert(write.round.clone(), write.status);
            application.audit = Some(write.audit.clone());
        }
        Ok(())
    }
}

/// Process-local jobs and students directory.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCampusDirectory {
    jobs: Arc<Mutex<HashMap<JobId, JobPosting>>>,
    students: Arc<Mutex<HashMap<StudentId, StudentProfile>>>,
}

impl InMemoryCampusDirectory {
    pub(crate) fn upsert_job(&self, job: JobPosting) {
        let mut guard = self.jobs.lock().expect("directory mutex poisoned");
        guard.insert(job.id.clone(), job);
    }

    pub(crate) fn upsert_student(&self, student: StudentProfile) {
        let mut guard = self.students.lock().expect("directory mutex poisoned");
        guard.insert(student.id.clone(), student);
    }
}

impl CampusDirectory for InMemoryCampusDirectory {
    fn job(&self, id: &JobId) -> Result<Option<JobPosting>, StoreError> {
        let guard = self.jobs.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn student(&self, id: &StudentId) -> Result<Option<StudentProfile>, StoreError> {
        let guard = self.students.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn advance_round(&self, id: &JobId) -> Result<JobPosting, StoreError> {
        let mut guard = self.jobs.lock().expect("directory mutex poisoned");
        let job = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        let last = job.rounds.len().saturating_sub(1);
        job.current_round_index = (job.current_round_index + 1).min(last);
        Ok(job.clone())
    }
}

/// Collects outbound notifications instead of delivering them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationSink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationSink {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("sink mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap_or_default(), Utc)
}
