use thiserror::Error;

use crate::domain::models::{AssignmentInstance, Question};
use crate::store::{EngineStore, StoreError};

/// Rejection reasons for a candidate question order, checked in this
/// priority order. The `Display` strings are the exact messages shown to
/// the instructor who submitted the reorder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("not a comma separated list of integers.")]
    NotAList,
    #[error("has negative values.")]
    NegativeValues,
    #[error("has at least one value bigger than the number of questions.")]
    ValueTooBig,
    #[error("there are duplicate values.")]
    DuplicateValues,
    #[error("does not match the number of questions.")]
    WrongLength,
}

#[derive(Debug, Error)]
pub enum ModifyOrderError {
    #[error(transparent)]
    Invalid(#[from] OrderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn identity_order(question_count: usize) -> Vec<usize> {
    (0..question_count).collect()
}

/// Validate a comma-separated candidate permutation over `question_count`
/// questions. Returns the parsed order; the caller only stores it on `Ok`,
/// so an invalid candidate never replaces the old order.
pub fn validate_order(candidate: &str, question_count: usize) -> Result<Vec<usize>, OrderError> {
    let mut values = Vec::new();
    for item in candidate.split(',') {
        let parsed = item.trim().parse::<i64>().map_err(|_| OrderError::NotAList)?;
        values.push(parsed);
    }

    if values.iter().any(|&value| value < 0) {
        return Err(OrderError::NegativeValues);
    }
    if values.iter().any(|&value| value >= question_count as i64) {
        return Err(OrderError::ValueTooBig);
    }

    let mut seen = vec![false; question_count];
    for &value in &values {
        if seen[value as usize] {
            return Err(OrderError::DuplicateValues);
        }
        seen[value as usize] = true;
    }

    // In-range and duplicate-free; only a short candidate can still break
    // the permutation invariant.
    if values.len() != question_count {
        return Err(OrderError::WrongLength);
    }

    Ok(values.into_iter().map(|value| value as usize).collect())
}

/// Project the template's questions through the instance order.
pub fn ordered_questions(questions: &[Question], order: &[usize]) -> Vec<Question> {
    order.iter().map(|&index| questions[index].clone()).collect()
}

/// Validate `candidate` against the instance's question count and apply it
/// through the store's versioned write. Concurrent updates lose with
/// `StoreError::Conflict` instead of interleaving.
pub async fn modify_order(
    store: &EngineStore,
    instance_id: &str,
    candidate: &str,
) -> Result<AssignmentInstance, ModifyOrderError> {
    let instance = store.instances.get_instance(instance_id).await?;
    let questions = store.templates.questions_of(&instance.template_id).await?;

    let order = validate_order(candidate, questions.len())?;
    let updated = store.instances.update_order(&instance.id, order, instance.version).await?;

    tracing::info!(
        instance_id = %updated.id,
        version = updated.version,
        "Applied new question order"
    );

    Ok(updated)
}
