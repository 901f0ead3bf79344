use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::workflows::hiring::domain::{
    Application, ApplicationId, HiringRound, JobId, JobPosting, RoundStatus, StudentId,
    StudentProfile,
};
use crate::workflows::hiring::repository::{
    ApplicationStore, CampusDirectory, Notification, NotificationSink, NotifyError, RoundWrite,
    StoreError,
};
use crate::workflows::hiring::service::PlacementService;

pub(super) fn applied_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).single().expect("valid timestamp")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).single().expect("valid timestamp")
}

pub(super) fn job() -> JobPosting {
    JobPosting {
        id: JobId("job-1".to_string()),
        company: "Orion Systems".to_string(),
        position: "Backend Engineer".to_string(),
        min_cgpa: Some(7.5),
        max_current_arrears: Some(1),
        max_history_arrears: Some(2),
        gender_preference: "Any".to_string(),
        eligible_batch: vec!["2024".to_string()],
        eligible_departments: vec!["CSE".to_string(), "IT".to_string()],
        skills: vec!["Rust".to_string(), "SQL".to_string()],
        rounds: vec![
            HiringRound {
                name: "Resume".to_string(),
                description: "Resume screen".to_string(),
            },
            HiringRound {
                name: "Interview".to_string(),
                description: "Technical interview".to_string(),
            },
            HiringRound {
                name: "HR".to_string(),
                description: "HR discussion".to_string(),
            },
        ],
        screening_questions: Vec::new(),
        current_round_index: 0,
        deadline: Some(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).single().expect("valid")),
    }
}

pub(super) fn student(suffix: &str) -> StudentProfile {
    StudentProfile {
        id: StudentId(format!("stu-{suffix}")),
        name: format!("Student {suffix}"),
        roll_number: format!("21CS{suffix}"),
        department: "CSE".to_string(),
        batch: "Batch 2024".to_string(),
        gender: "Female".to_string(),
        cgpa: 8.0,
        current_arrears: 0,
        history_arrears: 0,
        skills: vec!["rust".to_string(), "SQL".to_string(), "Docker".to_string()],
    }
}

pub(super) fn application(suffix: &str) -> Application {
    Application {
        id: ApplicationId(format!("app-{suffix}")),
        student_id: StudentId(format!("stu-{suffix}")),
        job_id: JobId("job-1".to_string()),
        status: Some("pending".to_string()),
        rounds: BTreeMap::from([("Resume".to_string(), RoundStatus::Pending)]),
        screening_answers: BTreeMap::new(),
        feedback: None,
        applied_at: applied_at(),
        audit: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplicationStore {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl MemoryApplicationStore {
    pub(super) fn seed(&self, application: Application) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(application.id.clone(), application);
    }

    pub(super) fn get(&self, id: &ApplicationId) -> Application {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
            .expect("application seeded")
    }
}

impl ApplicationStore for MemoryApplicationStore {
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
        // Validate the whole batch before touching anything so a bad id
        // cannot leave a partial round advancement behind.
        for write in writes {
            if !guard.contains_key(&write.application_id) {
                return Err(StoreError::NotFound);
            }
        }
        for write in writes {
            let application = guard
                .get_mut(&write.application_id)
                .expect("validated above");
            application
                .rounds
                .insert(write.round.clone(), write.status);
            application.audit = Some(write.audit.clone());
        }
        Ok(())
    }
}

/// Store double that refuses every batched write.
pub(super) struct UnavailableStore {
    pub(super) inner: MemoryApplicationStore,
}

impl ApplicationStore for UnavailableStore {
    fn insert(&self, application: Application) -> Result<Application, StoreError> {
        self.inner.insert(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.inner.fetch(id)
    }

    fn find_pair(
        &self,
        student: &StudentId,
        job: &JobId,
    ) -> Result<Option<Application>, StoreError> {
        self.inner.find_pair(student, job)
    }

    fn for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError> {
        self.inner.for_job(job)
    }

    fn batch_update(&self, _writes: &[RoundWrite]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    pub(super) jobs: Arc<Mutex<HashMap<JobId, JobPosting>>>,
    pub(super) students: Arc<Mutex<HashMap<StudentId, StudentProfile>>>,
}

impl MemoryDirectory {
    pub(super) fn seed_job(&self, job: JobPosting) {
        self.jobs
            .lock()
            .expect("directory mutex poisoned")
            .insert(job.id.clone(), job);
    }

    pub(super) fn seed_student(&self, student: StudentProfile) {
        self.students
            .lock()
            .expect("directory mutex poisoned")
            .insert(student.id.clone(), student);
    }
}

impl CampusDirectory for MemoryDirectory {
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

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Sink double whose transport always fails; operations must still succeed.
pub(super) struct BrokenNotifier;

impl NotificationSink for BrokenNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("sink offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    PlacementService<MemoryApplicationStore, MemoryDirectory, MemoryNotifier>,
    Arc<MemoryApplicationStore>,
    Arc<MemoryDirectory>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryApplicationStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifier = Arc::new(MemoryNotifier::default());
    directory.seed_job(job());
    let service = PlacementService::new(store.clone(), directory.clone(), notifier.clone());
    (service, store, directory, notifier)
}
