pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::domain::models::{
    AnswerRecord, AssignmentInstance, AssignmentTemplate, GroupMembership, Question, Student,
    StudentEnrollment,
};
use crate::domain::types::NotificationKind;

use self::memory::MemoryStore;

/// Errors surfaced by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("version conflict")]
    Conflict,

    #[error("storage backend: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get_template(&self, template_id: &str) -> Result<AssignmentTemplate, StoreError>;

    /// Questions of a template, in the template's authored order.
    async fn questions_of(&self, template_id: &str) -> Result<Vec<Question>, StoreError>;
}

#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn get_instance(&self, instance_id: &str) -> Result<AssignmentInstance, StoreError>;

    /// Replace the instance's question order. Compare-and-set on `version`:
    /// fails with `Conflict` if the stored version moved, leaving the stored
    /// order untouched.
    async fn update_order(
        &self,
        instance_id: &str,
        order: Vec<usize>,
        expected_version: u64,
    ) -> Result<AssignmentInstance, StoreError>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn get_enrollment(&self, enrollment_id: &str) -> Result<StudentEnrollment, StoreError>;

    /// Enrollments that carry a deadline, across all assignment instances.
    async fn list_with_deadline(&self) -> Result<Vec<StudentEnrollment>, StoreError>;

    /// Transition `reminder_sent` false→true. Returns whether the flag
    /// changed; a true→true call is a no-op, never an error.
    async fn mark_reminded(&self, enrollment_id: &str) -> Result<bool, StoreError>;

    /// Move the deadline and clear `reminder_sent` so the next sweep may
    /// notify again.
    async fn set_deadline(
        &self,
        enrollment_id: &str,
        deadline: Option<PrimitiveDateTime>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Answer rows scoped strictly by assignment-instance identity.
    async fn answers_for(
        &self,
        student_id: &str,
        instance_id: &str,
    ) -> Result<Vec<AnswerRecord>, StoreError>;
}

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn get_student(&self, student_id: &str) -> Result<Student, StoreError>;

    async fn members_of(&self, group_id: &str) -> Result<Vec<GroupMembership>, StoreError>;

    async fn membership_for(
        &self,
        group_id: &str,
        student_id: &str,
    ) -> Result<GroupMembership, StoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(
        &self,
        student_id: &str,
        kind: NotificationKind,
        link: &str,
    ) -> Result<String, StoreError>;
}

/// Aggregates the collaborator stores behind trait objects so backends can
/// be swapped per seam.
#[derive(Clone)]
pub struct EngineStore {
    pub templates: Arc<dyn TemplateStore>,
    pub instances: Arc<dyn InstanceStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub answers: Arc<dyn AnswerStore>,
    pub roster: Arc<dyn RosterStore>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl EngineStore {
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            templates: store.clone(),
            instances: store.clone(),
            enrollments: store.clone(),
            answers: store.clone(),
            roster: store.clone(),
            notifications: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }
}
