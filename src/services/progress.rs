use std::collections::HashMap;

use crate::domain::models::{AnswerRecord, Question};
use crate::domain::types::ProgressPhase;
use crate::services::ordering;
use crate::store::{EngineStore, StoreError};

#[derive(Debug, Clone)]
pub struct StudentProgress {
    pub phase: ProgressPhase,
    pub current: Option<Question>,
}

/// Two-phase scan over the ordered question list. Rounds are global: no
/// question enters round two before every question has a first answer, so
/// phase one returns the first question with no answer row at all, phase
/// two the first row still missing a second choice. Both exhausted means
/// the student is done.
pub fn current_question<'a>(
    questions: &'a [Question],
    answers: &[AnswerRecord],
) -> (ProgressPhase, Option<&'a Question>) {
    let by_question: HashMap<&str, &AnswerRecord> =
        answers.iter().map(|record| (record.question_id.as_str(), record)).collect();

    if let Some(question) =
        questions.iter().find(|question| !by_question.contains_key(question.id.as_str()))
    {
        return (ProgressPhase::FirstRound, Some(question));
    }

    if let Some(question) = questions.iter().find(|question| {
        by_question
            .get(question.id.as_str())
            .map_or(false, |record| record.second_choice.is_none())
    }) {
        return (ProgressPhase::SecondRound, Some(question));
    }

    (ProgressPhase::Done, None)
}

/// Resolve the current question for one student on one assignment instance.
/// Absence of answers is a normal state, never an error.
pub async fn current_question_for(
    store: &EngineStore,
    student_id: &str,
    instance_id: &str,
) -> Result<StudentProgress, StoreError> {
    let instance = store.instances.get_instance(instance_id).await?;
    let questions = store.templates.questions_of(&instance.template_id).await?;
    let ordered = ordering::ordered_questions(&questions, &instance.order);
    let answers = store.answers.answers_for(student_id, &instance.id).await?;

    let (phase, current) = current_question(&ordered, &answers);
    Ok(StudentProgress { phase, current: current.cloned() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn answer(question_id: &str, second_choice: Option<i32>) -> AnswerRecord {
        test_support::answer_record("student-1", "instance-1", question_id, 0, second_choice)
    }

    #[test]
    fn no_answers_starts_at_the_first_question() {
        let questions = test_support::sample_questions(5);
        let (phase, current) = current_question(&questions, &[]);
        assert_eq!(phase, ProgressPhase::FirstRound);
        assert_eq!(current.expect("question").id, "q0");
    }

    #[test]
    fn first_round_resumes_at_the_first_gap() {
        let questions = test_support::sample_questions(5);
        let answers: Vec<AnswerRecord> =
            ["q0", "q1", "q2"].iter().map(|id| answer(id, None)).collect();

        let (phase, current) = current_question(&questions, &answers);
        assert_eq!(phase, ProgressPhase::FirstRound);
        assert_eq!(current.expect("question").id, "q3");
    }

    #[test]
    fn completed_first_round_wraps_to_the_start_for_round_two() {
        let questions = test_support::sample_questions(5);
        let answers: Vec<AnswerRecord> =
            questions.iter().map(|question| answer(&question.id, None)).collect();

        let (phase, current) = current_question(&questions, &answers);
        assert_eq!(phase, ProgressPhase::SecondRound);
        assert_eq!(current.expect("question").id, "q0");
    }

    #[test]
    fn second_round_resumes_at_the_first_missing_second_choice() {
        let questions = test_support::sample_questions(4);
        let answers = vec![
            answer("q0", Some(1)),
            answer("q1", Some(0)),
            answer("q2", None),
            answer("q3", None),
        ];

        let (phase, current) = current_question(&questions, &answers);
        assert_eq!(phase, ProgressPhase::SecondRound);
        assert_eq!(current.expect("question").id, "q2");
    }

    #[test]
    fn fully_answered_history_is_done() {
        let questions = test_support::sample_questions(3);
        let answers: Vec<AnswerRecord> =
            questions.iter().map(|question| answer(&question.id, Some(0))).collect();

        let (phase, current) = current_question(&questions, &answers);
        assert_eq!(phase, ProgressPhase::Done);
        assert!(current.is_none());
    }

    #[test]
    fn scan_respects_the_instance_order() {
        let questions = test_support::sample_questions(3);
        let reordered = ordering::ordered_questions(&questions, &[2, 1, 0]);
        // q2 comes first in this instance, so it is the gap to fill.
        let answers = vec![answer("q0", None), answer("q1", None)];

        let (phase, current) = current_question(&reordered, &answers);
        assert_eq!(phase, ProgressPhase::FirstRound);
        assert_eq!(current.expect("question").id, "q2");
    }

    #[tokio::test]
    async fn current_question_for_reads_through_the_store() {
        let (engine, store) = test_support::engine_store();
        let instance = test_support::seed_assignment(&store, 5);
        let student = store.insert_student("ada", "ada@example.org");

        for id in ["q0", "q1", "q2"] {
            store.upsert_answer(&student.id, &instance.id, id, 0, None);
        }

        let progress =
            current_question_for(&engine, &student.id, &instance.id).await.expect("progress");
        assert_eq!(progress.phase, ProgressPhase::FirstRound);
        assert_eq!(progress.current.expect("question").id, "q3");
    }
}
