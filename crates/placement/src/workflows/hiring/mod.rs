//! Hiring-round progression and eligibility engine for the placement portal.
//!
//! Three cooperating parts over plain in-memory snapshots fetched from the
//! document store: the eligibility evaluator gates who may apply, the
//! progress module derives each student's stage from the round-status map,
//! and the transition planner turns an admin's shortlist decision into one
//! atomic batch of round-key writes.

pub mod domain;
pub mod eligibility;
pub mod progress;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, AuditStamp, HiringRound, JobId, JobPosting, QuestionKind,
    RoundStatus, RoundTransition, ScreeningQuestion, StudentId, StudentProfile,
};
pub use eligibility::{EligibilityEngine, EligibilityReport, IneligibilityReason};
pub use progress::ProgressPoint;
pub use repository::{
    ApplicationStore, CampusDirectory, Notification, NotificationSink, NotifyError, Recipient,
    RoundWrite, StoreError,
};
pub use router::placement_router;
pub use service::{ApplicationStatusView, BulkOutcome, PlacementService, PlacementServiceError};
pub use transitions::{TransitionError, TransitionPlan};
