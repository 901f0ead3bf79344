use crate::infra::{
    parse_date, utc_midnight, InMemoryApplicationStore, InMemoryCampusDirectory,
    InMemoryNotificationSink,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use placement::error::AppError;
use placement::workflows::hiring::{
    HiringRound, JobId, JobPosting, PlacementService, PlacementServiceError, Recipient,
    StudentId, StudentProfile,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Application date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) applied_on: Option<NaiveDate>,
    /// Stop after the eligibility and application stage.
    #[arg(long)]
    pub(crate) skip_rounds: bool,
}

const DEMO_JOB: &str = "job-nimbus-grad";

/// Seed the directory with the demo posting and a small cohort. Also used by
/// the server so a fresh instance answers requests out of the box.
pub(crate) fn sample_campus(directory: &InMemoryCampusDirectory) {
    directory.upsert_job(JobPosting {
        id: JobId(DEMO_JOB.to_string()),
        company: "Nimbus Analytics".to_string(),
        position: "Graduate Engineer".to_string(),
        min_cgpa: Some(7.0),
        max_current_arrears: Some(0),
        max_history_arrears: Some(2),
        gender_preference: "Any".to_string(),
        eligible_batch: vec!["2025".to_string()],
        eligible_departments: vec!["CSE".to_string(), "ECE".to_string()],
        skills: vec!["Python".to_string(), "SQL".to_string()],
        rounds: vec![
            HiringRound {
                name: "Aptitude Test".to_string(),
                description: "Online aptitude assessment".to_string(),
            },
            HiringRound {
                name: "Technical Interview".to_string(),
                description: "Problem solving with the engineering panel".to_string(),
            },
            HiringRound {
                name: "HR Interview".to_string(),
                description: "Culture fit and offer discussion".to_string(),
            },
        ],
        screening_questions: Vec::new(),
        current_round_index: 0,
        deadline: None,
    });

    directory.upsert_student(StudentProfile {
        id: StudentId("stu-asha".to_string()),
        name: "Asha Verma".to_string(),
        roll_number: "22CS014".to_string(),
        department: "CSE".to_string(),
        batch: "Batch 2025".to_string(),
        gender: "Female".to_string(),
        cgpa: 8.6,
        current_arrears: 0,
        history_arrears: 0,
        skills: vec!["Python".to_string(), "SQL".to_string(), "Spark".to_string()],
    });
    directory.upsert_student(StudentProfile {
        id: StudentId("stu-rahul".to_string()),
        name: "Rahul Nair".to_string(),
        roll_number: "22CS061".to_string(),
        department: "CSE".to_string(),
        batch: "Batch 2025".to_string(),
        gender: "Male".to_string(),
        cgpa: 7.4,
        current_arrears: 0,
        history_arrears: 1,
        skills: vec!["Python".to_string(), "SQL".to_string()],
    });
    directory.upsert_student(StudentProfile {
        id: StudentId("stu-meera".to_string()),
        name: "Meera Pillai".to_string(),
        roll_number: "22EC033".to_string(),
        department: "ECE".to_string(),
        batch: "Batch 2025".to_string(),
        gender: "Female".to_string(),
        cgpa: 6.4,
        current_arrears: 1,
        history_arrears: 3,
        skills: vec!["Python".to_string()],
    });
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applied_on,
        skip_rounds,
    } = args;

    let applied_on = applied_on.unwrap_or_else(|| Local::now().date_naive());
    let now = utc_midnight(applied_on);

    println!("Campus placement drive demo");

    let store = Arc::new(InMemoryApplicationStore::default());
    let directory = Arc::new(InMemoryCampusDirectory::default());
    let sink = Arc::new(InMemoryNotificationSink::default());
    sample_campus(&directory);
    let service = PlacementService::new(store, directory, sink.clone());

    let job_id = JobId(DEMO_JOB.to_string());
    let cohort = ["stu-asha", "stu-rahul", "stu-meera"];

    println!("\nEligibility screening for Graduate Engineer at Nimbus Analytics");
    for student in cohort {
        let student_id = StudentId(student.to_string());
        let report = match service.eligibility(&student_id, &job_id) {
            Ok(report) => report,
            Err(err) => {
                println!("  Evaluation unavailable for {student}: {err}");
                return Ok(());
            }
        };
        let verdict = if report.eligible { "eligible" } else { "not eligible" };
        println!(
            "- {student}: {verdict} (skill match {}%)",
            report.skill_match_pct
        );
        for line in report.reason_lines() {
            println!("    - {line}");
        }
    }

    println!("\nApplication intake on {applied_on}");
    let mut accepted = Vec::new();
    for student in cohort {
        let student_id = StudentId(student.to_string());
        match service.apply(&student_id, &job_id, BTreeMap::new(), now) {
            Ok(application) => {
                println!("- {student} -> application {}", application.id.0);
                accepted.push(application.id);
            }
            Err(PlacementServiceError::Ineligible(report)) => {
                println!("- {student} -> rejected at intake:");
                for line in report.reason_lines() {
                    println!("    - {line}");
                }
            }
            Err(err) => {
                println!("- {student} -> intake failed: {err}");
                return Ok(());
            }
        }
    }

    if skip_rounds || accepted.is_empty() {
        return Ok(());
    }

    println!("\nRound 1: Aptitude Test shortlist (top candidate only)");
    let selected = BTreeSet::from([accepted[0].clone()]);
    let pool: BTreeSet<_> = accepted.iter().cloned().collect();
    let outcome = match service.shortlist(&job_id, "Aptitude Test", &selected, &pool, now) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Shortlist failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- promoted {} | rejected {} | skipped {}",
        outcome.promoted,
        outcome.rejected,
        outcome.skipped.len()
    );

    if let Err(err) = service.complete_round(&job_id) {
        println!("  Round completion failed: {err}");
        return Ok(());
    }
    println!("- Aptitude Test closed; Technical Interview is now open for bulk actions");

    println!("\nApplication status after round 1");
    for id in &accepted {
        let view = match service.application_status(id) {
            Ok(view) => view,
            Err(err) => {
                println!("  Status unavailable for {}: {err}", id.0);
                return Ok(());
            }
        };
        let current = view.current_round.as_deref().unwrap_or("-");
        println!(
            "- {} ({}) -> round {} | {:.0}% complete | withdrawn: {}",
            view.application_id.0, view.student_id.0, current, view.progress_pct, view.withdrawn
        );
    }

    if let Some(id) = accepted.first() {
        if let Ok(view) = service.application_status(id) {
            match serde_json::to_string_pretty(&view) {
                Ok(json) => println!("\nPublic status payload for {}:\n{json}", id.0),
                Err(err) => println!("\nPublic status payload unavailable: {err}"),
            }
        }
    }

    let events = sink.events();
    println!("\nNotifications dispatched: {}", events.len());
    for event in events {
        let recipient = match &event.recipient {
            Recipient::Student(id) => id.0.as_str(),
            Recipient::Broadcast => "everyone",
        };
        println!("- [{recipient}] {}: {}", event.title, event.message);
    }

    Ok(())
}
