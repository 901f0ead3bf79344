use std::collections::BTreeSet;

use super::super::domain::{normalize, JobPosting, StudentProfile};
use super::IneligibilityReason;

/// Run every criterion check, collecting one reason per failure. All criteria
/// must pass for the aggregate to pass.
pub(crate) fn check_criteria(
    student: &StudentProfile,
    job: &JobPosting,
) -> Vec<IneligibilityReason> {
    let mut reasons = Vec::new();

    let required_cgpa = job.min_cgpa.unwrap_or(0.0);
    if student.cgpa < required_cgpa {
        reasons.push(IneligibilityReason::CgpaBelowMinimum {
            student: student.cgpa,
            required: required_cgpa,
        });
    }

    let student_skills = normalized_set(&student.skills);
    let missing: Vec<String> = job
        .skills
        .iter()
        .map(|skill| normalize(skill))
        .filter(|skill| !student_skills.contains(skill))
        .collect();
    if !missing.is_empty() {
        reasons.push(IneligibilityReason::MissingSkills(missing));
    }

    if !batch_matches(&student.batch, &job.eligible_batch) {
        reasons.push(IneligibilityReason::BatchMismatch {
            student: student.batch.clone(),
            required: job.eligible_batch.clone(),
        });
    }

    let preference = normalize(&job.gender_preference);
    if preference != "any" && preference != normalize(&student.gender) {
        reasons.push(IneligibilityReason::GenderMismatch {
            student: student.gender.clone(),
            required: job.gender_preference.clone(),
        });
    }

    if let Some(max) = job.max_current_arrears {
        if student.current_arrears > max {
            reasons.push(IneligibilityReason::CurrentArrearsExceeded {
                student: student.current_arrears,
                max,
            });
        }
    }

    if let Some(max) = job.max_history_arrears {
        if student.history_arrears > max {
            reasons.push(IneligibilityReason::HistoryArrearsExceeded {
                student: student.history_arrears,
                max,
            });
        }
    }

    reasons
}

/// Percentage overlap between the job's required skills and the student's,
/// case-insensitive. An empty requirement is a vacuous full match.
pub(crate) fn skill_match_pct(student: &StudentProfile, job: &JobPosting) -> u8 {
    if job.skills.is_empty() {
        return 100;
    }
    if student.skills.is_empty() {
        return 0;
    }

    let student_skills = normalized_set(&student.skills);
    let matched = job
        .skills
        .iter()
        .filter(|skill| student_skills.contains(&normalize(skill)))
        .count();

    ((matched as f64 / job.skills.len() as f64) * 100.0).round() as u8
}

/// Substring match in either direction so "2024" and "Batch 2024" agree.
/// An empty eligible list auto-passes.
fn batch_matches(student_batch: &str, eligible: &[String]) -> bool {
    if eligible.is_empty() {
        return true;
    }

    let student = normalize(student_batch);
    eligible.iter().any(|entry| {
        let entry = normalize(entry);
        student.contains(&entry) || entry.contains(&student)
    })
}

fn normalized_set(skills: &[String]) -> BTreeSet<String> {
    skills.iter().map(|skill| normalize(skill)).collect()
}
