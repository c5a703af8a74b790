use std::collections::HashMap;

use crate::domain::models::{AnswerRecord, Question};
use crate::services::ordering;
use crate::store::{EngineStore, StoreError};

/// Per-question answer counts across a roster.
#[derive(Debug, Clone)]
pub struct QuestionBreakdown {
    pub question: Question,
    pub first: usize,
    pub first_correct: usize,
    pub second: usize,
    pub second_correct: usize,
}

#[derive(Debug, Clone)]
pub struct CohortReport {
    pub student_ids: Vec<String>,
    pub questions: Vec<QuestionBreakdown>,
}

/// Roll one answer set per student up into per-question counters, in
/// instance order. One pass per student, so the instructor report costs
/// O(students × questions) instead of a lookup per cell.
pub fn breakdown(questions: &[Question], answer_sets: &[Vec<AnswerRecord>]) -> Vec<QuestionBreakdown> {
    let indexed: Vec<HashMap<&str, &AnswerRecord>> = answer_sets
        .iter()
        .map(|answers| answers.iter().map(|record| (record.question_id.as_str(), record)).collect())
        .collect();

    questions
        .iter()
        .map(|question| {
            let mut stats = QuestionBreakdown {
                question: question.clone(),
                first: 0,
                first_correct: 0,
                second: 0,
                second_correct: 0,
            };
            for answers in &indexed {
                let Some(record) = answers.get(question.id.as_str()) else {
                    continue;
                };
                stats.first += 1;
                if question.is_correct(record.first_choice) {
                    stats.first_correct += 1;
                }
                if let Some(second) = record.second_choice {
                    stats.second += 1;
                    if question.is_correct(second) {
                        stats.second_correct += 1;
                    }
                }
            }
            stats
        })
        .collect()
}

/// Instructor-facing progress report for one assignment instance: the full
/// group roster plus the per-question breakdown.
pub async fn report_for(store: &EngineStore, instance_id: &str) -> Result<CohortReport, StoreError> {
    let instance = store.instances.get_instance(instance_id).await?;
    let questions = store.templates.questions_of(&instance.template_id).await?;
    let ordered = ordering::ordered_questions(&questions, &instance.order);

    let members = store.roster.members_of(&instance.group_id).await?;
    let mut student_ids = Vec::with_capacity(members.len());
    let mut answer_sets = Vec::with_capacity(members.len());
    for member in &members {
        answer_sets.push(store.answers.answers_for(&member.student_id, &instance.id).await?);
        student_ids.push(member.student_id.clone());
    }

    Ok(CohortReport { student_ids, questions: breakdown(&ordered, &answer_sets) })
}
