use std::collections::BTreeSet;

use super::common::{application, job, now};
use crate::workflows::hiring::domain::{ApplicationId, RoundStatus};
use crate::workflows::hiring::transitions::{self, TransitionError};

fn ids(suffixes: &[&str]) -> BTreeSet<ApplicationId> {
    suffixes
        .iter()
        .map(|suffix| ApplicationId(format!("app-{suffix}")))
        .collect()
}

#[test]
fn shortlist_partitions_the_pool_into_promote_and_reject() {
    let posting = job();
    let pool = vec![application("1"), application("2")];

    let plan =
        transitions::plan_shortlist(&posting, "Resume", &ids(&["1"]), &pool).expect("plan builds");

    assert_eq!(plan.current_round, "Resume");
    assert_eq!(plan.next_round, Some("Interview".to_string()));
    assert_eq!(plan.promote, vec![ApplicationId("app-1".to_string())]);
    assert_eq!(plan.reject, vec![ApplicationId("app-2".to_string())]);
    assert!(plan.skipped.is_empty());
}

#[test]
fn promoted_applications_get_the_next_round_seeded_pending() {
    let posting = job();
    let pool = vec![application("1"), application("2")];
    let plan =
        transitions::plan_shortlist(&posting, "Resume", &ids(&["1"]), &pool).expect("plan builds");

    let writes = plan.writes(now(), "admin", &pool);

    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0].application_id, ApplicationId("app-1".to_string()));
    assert_eq!(writes[0].round, "Resume");
    assert_eq!(writes[0].status, RoundStatus::Shortlisted);
    assert_eq!(writes[0].audit.previous_status, Some(RoundStatus::Pending));
    assert_eq!(writes[0].audit.last_modified_by, "admin");

    assert_eq!(writes[1].application_id, ApplicationId("app-1".to_string()));
    assert_eq!(writes[1].round, "Interview");
    assert_eq!(writes[1].status, RoundStatus::Pending);
    assert_eq!(writes[1].audit.previous_status, None);

    assert_eq!(writes[2].application_id, ApplicationId("app-2".to_string()));
    assert_eq!(writes[2].round, "Resume");
    assert_eq!(writes[2].status, RoundStatus::Rejected);
}

#[test]
fn terminal_round_promotion_seeds_no_next_round() {
    let mut posting = job();
    posting.current_round_index = 2;
    let mut entry = application("1");
    entry
        .rounds
        .insert("Resume".to_string(), RoundStatus::Shortlisted);
    entry
        .rounds
        .insert("Interview".to_string(), RoundStatus::Shortlisted);
    let pool = vec![entry];

    let plan = transitions::plan_shortlist(&posting, "HR", &ids(&["1"]), &pool).expect("plan");
    assert_eq!(plan.next_round, None);

    let writes = plan.writes(now(), "admin", &pool);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].round, "HR");
    assert_eq!(writes[0].status, RoundStatus::Shortlisted);
}

#[test]
fn shortlist_refuses_a_round_that_is_not_open() {
    let posting = job();
    let pool = vec![application("1")];

    let error = transitions::plan_shortlist(&posting, "Interview", &ids(&["1"]), &pool)
        .expect_err("round gate");

    match error {
        TransitionError::RoundNotOpen { requested, open } => {
            assert_eq!(requested, "Interview");
            assert_eq!(open, "Resume");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn shortlist_refuses_an_unknown_round() {
    let posting = job();
    let pool = vec![application("1")];

    let error = transitions::plan_shortlist(&posting, "Aptitude", &ids(&["1"]), &pool)
        .expect_err("round gate");

    assert!(matches!(error, TransitionError::RoundNotFound(name) if name == "Aptitude"));
}

#[test]
fn shortlist_refuses_a_selection_outside_the_pool() {
    let posting = job();
    let pool = vec![application("1")];

    let error = transitions::plan_shortlist(&posting, "Resume", &ids(&["9"]), &pool)
        .expect_err("pool gate");

    assert!(matches!(
        error,
        TransitionError::UnknownApplication(id) if id == ApplicationId("app-9".to_string()),
    ));
}

#[test]
fn shortlist_refuses_a_selection_that_skipped_the_previous_round() {
    let mut posting = job();
    posting.current_round_index = 1;
    // Never shortlisted in Resume, so Interview is out of reach.
    let pool = vec![application("1")];

    let error = transitions::plan_shortlist(&posting, "Interview", &ids(&["1"]), &pool)
        .expect_err("progression gate");

    assert!(matches!(
        error,
        TransitionError::NotEligibleForRound { round, .. } if round == "Interview",
    ));
}

#[test]
fn withdrawn_applications_are_skipped_not_rejected() {
    let posting = job();
    let mut withdrawn = application("2");
    withdrawn
        .rounds
        .insert("Resume".to_string(), RoundStatus::Withdrawn);
    let pool = vec![application("1"), withdrawn];

    let plan =
        transitions::plan_shortlist(&posting, "Resume", &ids(&["1"]), &pool).expect("plan builds");

    assert_eq!(plan.promote, vec![ApplicationId("app-1".to_string())]);
    assert!(plan.reject.is_empty());
    assert_eq!(plan.skipped, vec![ApplicationId("app-2".to_string())]);

    // No write touches the withdrawn application.
    let writes = plan.writes(now(), "admin", &pool);
    assert!(writes
        .iter()
        .all(|write| write.application_id != ApplicationId("app-2".to_string())));
}

#[test]
fn selecting_a_withdrawn_application_never_promotes_it() {
    let posting = job();
    let mut withdrawn = application("1");
    withdrawn
        .rounds
        .insert("Resume".to_string(), RoundStatus::Withdrawn);
    let pool = vec![withdrawn];

    let plan =
        transitions::plan_shortlist(&posting, "Resume", &ids(&["1"]), &pool).expect("plan builds");

    assert!(plan.promote.is_empty());
    assert_eq!(plan.skipped, vec![ApplicationId("app-1".to_string())]);
    assert!(plan.writes(now(), "admin", &pool).is_empty());
}

#[test]
fn reject_touches_exactly_the_named_applications() {
    let posting = job();
    let pool = vec![application("1")];

    let plan = transitions::plan_reject(&posting, "Resume", &ids(&["1"]), &pool).expect("plan");

    assert!(plan.promote.is_empty());
    assert_eq!(plan.reject, vec![ApplicationId("app-1".to_string())]);

    let writes = plan.writes(now(), "admin", &pool);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].status, RoundStatus::Rejected);
}

#[test]
fn rejecting_an_already_rejected_application_is_idempotent() {
    let posting = job();
    let mut entry = application("1");
    entry
        .rounds
        .insert("Resume".to_string(), RoundStatus::Rejected);
    let pool = vec![entry];

    let plan = transitions::plan_reject(&posting, "Resume", &ids(&["1"]), &pool).expect("plan");
    let writes = plan.writes(now(), "admin", &pool);

    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].status, RoundStatus::Rejected);
    assert_eq!(writes[0].audit.previous_status, Some(RoundStatus::Rejected));
}

#[test]
fn reject_skips_withdrawn_applications() {
    let posting = job();
    let mut withdrawn = application("1");
    withdrawn
        .rounds
        .insert("Resume".to_string(), RoundStatus::Withdrawn);
    let pool = vec![withdrawn];

    let plan = transitions::plan_reject(&posting, "Resume", &ids(&["1"]), &pool).expect("plan");

    assert!(plan.reject.is_empty());
    assert_eq!(plan.skipped, vec![ApplicationId("app-1".to_string())]);
    assert!(plan.is_empty());
}

#[test]
fn empty_selection_rejects_the_whole_pool() {
    let posting = job();
    let pool = vec![application("1"), application("2")];

    let plan = transitions::plan_shortlist(&posting, "Resume", &BTreeSet::new(), &pool)
        .expect("plan builds");

    assert!(plan.promote.is_empty());
    assert_eq!(plan.reject.len(), 2);
}
