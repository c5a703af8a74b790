use std::collections::HashMap;

use crate::domain::models::{AnswerRecord, Question};
use crate::services::ordering;
use crate::store::{EngineStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResults {
    pub total: usize,
    pub completed_count: usize,
    pub first_correct: usize,
    pub second_correct: usize,
    pub grade: f64,
    pub completed: bool,
}

/// Completion and grade over one student's answers for one instance.
///
/// Each round contributes half a point per correct choice, so
/// `grade = 0.5 * (first_correct + second_correct)` covers every
/// combination without clamping. Rows for questions outside the instance's
/// question set are ignored; completion counts only this instance's rows.
pub fn results(questions: &[Question], answers: &[AnswerRecord]) -> AssessmentResults {
    let by_id: HashMap<&str, &Question> =
        questions.iter().map(|question| (question.id.as_str(), question)).collect();

    let mut completed_count = 0;
    let mut first_correct = 0;
    let mut second_correct = 0;

    for record in answers {
        let Some(question) = by_id.get(record.question_id.as_str()) else {
            continue;
        };
        if question.is_correct(record.first_choice) {
            first_correct += 1;
        }
        if let Some(second) = record.second_choice {
            completed_count += 1;
            if question.is_correct(second) {
                second_correct += 1;
            }
        }
    }

    let total = questions.len();
    AssessmentResults {
        total,
        completed_count,
        first_correct,
        second_correct,
        grade: 0.5 * (first_correct + second_correct) as f64,
        completed: completed_count == total,
    }
}

pub async fn results_for(
    store: &EngineStore,
    student_id: &str,
    instance_id: &str,
) -> Result<AssessmentResults, StoreError> {
    let instance = store.instances.get_instance(instance_id).await?;
    let questions = store.templates.questions_of(&instance.template_id).await?;
    let ordered = ordering::ordered_questions(&questions, &instance.order);
    let answers = store.answers.answers_for(student_id, &instance.id).await?;

    Ok(results(&ordered, &answers))
}
