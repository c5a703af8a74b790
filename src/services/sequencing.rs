use crate::domain::models::Question;

/// Question at `index` of the ordered list. Callers index within bounds.
pub fn by_index<'a>(questions: &'a [Question], index: usize) -> &'a Question {
    &questions[index]
}

/// The question immediately after (or before) `current_id` in the ordered
/// list. Matches by question identity, so the answer stays correct after a
/// reorder; `None` off either end or when the id is not in the list.
pub fn adjacent<'a>(
    questions: &'a [Question],
    current_id: &str,
    after: bool,
) -> Option<&'a Question> {
    let position = questions.iter().position(|question| question.id == current_id)?;
    if after {
        questions.get(position + 1)
    } else {
        position.checked_sub(1).map(|previous| &questions[previous])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ordering;
    use crate::test_support;

    #[test]
    fn by_index_resolves_positions() {
        let questions = test_support::sample_questions(3);
        assert_eq!(by_index(&questions, 0).id, "q0");
        assert_eq!(by_index(&questions, 2).id, "q2");
    }

    #[test]
    fn adjacent_walks_both_directions() {
        let questions = test_support::sample_questions(3);
        assert_eq!(adjacent(&questions, "q1", true).expect("next").id, "q2");
        assert_eq!(adjacent(&questions, "q1", false).expect("previous").id, "q0");
    }

    #[test]
    fn adjacent_is_none_off_either_end() {
        let questions = test_support::sample_questions(3);
        assert!(adjacent(&questions, "q2", true).is_none());
        assert!(adjacent(&questions, "q0", false).is_none());
    }

    #[test]
    fn adjacent_is_none_for_an_unknown_id() {
        let questions = test_support::sample_questions(3);
        assert!(adjacent(&questions, "missing", true).is_none());
    }

    #[test]
    fn adjacent_follows_the_applied_order_not_template_positions() {
        let questions = test_support::sample_questions(3);
        let reordered = ordering::ordered_questions(&questions, &[2, 0, 1]);
        // q0 sits in the middle of the reordered list.
        assert_eq!(adjacent(&reordered, "q0", true).expect("next").id, "q1");
        assert_eq!(adjacent(&reordered, "q0", false).expect("previous").id, "q2");
    }
}
