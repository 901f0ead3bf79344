use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, AuditStamp, JobId, JobPosting, RoundStatus, StudentId,
    StudentProfile,
};

/// One round-key field update destined for the document store. Batches of
/// these are applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundWrite {
    pub application_id: ApplicationId,
    pub round: String,
    pub status: RoundStatus,
    pub audit: AuditStamp,
}

/// Storage abstraction over the applications collection so the engine and
/// service can be exercised in isolation.
pub trait ApplicationStore: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    /// Lookup by the student x job pair; pair uniqueness is checked here at
    /// write time because the store does not enforce it.
    fn find_pair(
        &self,
        student: &StudentId,
        job: &JobId,
    ) -> Result<Option<Application>, StoreError>;
    fn for_job(&self, job: &JobId) -> Result<Vec<Application>, StoreError>;
    /// Atomic multi-document write: either every round-key update lands or
    /// none do. No isolation guarantee against a concurrent batch.
    fn batch_update(&self, writes: &[RoundWrite]) -> Result<(), StoreError>;
}

/// Read side for the jobs and students collections, plus the one job
/// mutation this engine owns (advancing the open-round pointer).
pub trait CampusDirectory: Send + Sync {
    fn job(&self, id: &JobId) -> Result<Option<JobPosting>, StoreError>;
    fn student(&self, id: &StudentId) -> Result<Option<StudentProfile>, StoreError>;
    /// Advance `currentRoundIndex` by one, clamped to the last round.
    fn advance_round(&self, id: &JobId) -> Result<JobPosting, StoreError>;
}

/// Error enumeration for document-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document already exists")]
    Conflict,
    #[error("document not found")]
    NotFound,
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Recipient of a notification document; `Broadcast` targets every student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Student(StudentId),
    Broadcast,
}

/// Notification payload written to the notifications collection.
/// Fire-and-forget: delivery failures are logged and never block the
/// operation that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    pub action_link: String,
}

impl Notification {
    /// Status-update notification with the portal's message catalog.
    pub fn status_update(
        student: StudentId,
        position: &str,
        round: &str,
        status: RoundStatus,
    ) -> Self {
        let message = match status {
            RoundStatus::Pending => "Your application is now under review.".to_string(),
            RoundStatus::Shortlisted => {
                "Congratulations! You have been shortlisted.".to_string()
            }
            RoundStatus::Rejected => {
                "We regret to inform you that your application was not selected.".to_string()
            }
            RoundStatus::Withdrawn => "Your application has been withdrawn.".to_string(),
        };

        Self {
            recipient: Recipient::Student(student),
            title: format!("Application Status Update: {position} ({round})"),
            message,
            action_link: "/student/applications".to_string(),
        }
    }

    pub fn application_received(student: StudentId, position: &str, company: &str) -> Self {
        Self {
            recipient: Recipient::Student(student),
            title: format!("Application Received: {position} at {company}"),
            message: "Your application has been submitted successfully.".to_string(),
            action_link: "/student/applications".to_string(),
        }
    }
}

/// Outbound notification hook (e.g., the portal's notifications collection).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
