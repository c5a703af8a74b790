use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::domain::models::{
    AnswerRecord, AssignmentInstance, AssignmentTemplate, GroupMembership, Notification, Question,
    Student, StudentEnrollment,
};
use crate::domain::types::NotificationKind;

use super::{
    AnswerStore, EnrollmentStore, InstanceStore, NotificationSink, RosterStore, StoreError,
    TemplateStore,
};

/// Arena-style reference backend. Every collection lives behind one lock so
/// a single call observes one consistent snapshot.
#[derive(Default)]
pub struct MemoryStore {
    arenas: RwLock<Arenas>,
}

#[derive(Default)]
struct Arenas {
    students: HashMap<String, Student>,
    questions: HashMap<String, Question>,
    templates: HashMap<String, AssignmentTemplate>,
    instances: HashMap<String, AssignmentInstance>,
    enrollments: HashMap<String, StudentEnrollment>,
    memberships: Vec<GroupMembership>,
    answers: Vec<AnswerRecord>,
    notifications: Vec<Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Arenas>, StoreError> {
        self.arenas.read().map_err(|err| StoreError::Backend(err.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Arenas>, StoreError> {
        self.arenas.write().map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn get_template(&self, template_id: &str) -> Result<AssignmentTemplate, StoreError> {
        self.read()?.templates.get(template_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn questions_of(&self, template_id: &str) -> Result<Vec<Question>, StoreError> {
        let arenas = self.read()?;
        let template = arenas.templates.get(template_id).ok_or(StoreError::NotFound)?;
        template
            .question_ids
            .iter()
            .map(|id| arenas.questions.get(id).cloned().ok_or(StoreError::NotFound))
            .collect()
    }
}

#[async_trait]
impl InstanceStore for MemoryStore {
    async fn get_instance(&self, instance_id: &str) -> Result<AssignmentInstance, StoreError> {
        self.read()?.instances.get(instance_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_order(
        &self,
        instance_id: &str,
        order: Vec<usize>,
        expected_version: u64,
    ) -> Result<AssignmentInstance, StoreError> {
        let mut arenas = self.write()?;
        let instance = arenas.instances.get_mut(instance_id).ok_or(StoreError::NotFound)?;
        if instance.version != expected_version {
            return Err(StoreError::Conflict);
        }
        instance.order = order;
        instance.version += 1;
        instance.updated_at = primitive_now_utc();
        Ok(instance.clone())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn get_enrollment(&self, enrollment_id: &str) -> Result<StudentEnrollment, StoreError> {
        self.read()?.enrollments.get(enrollment_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_with_deadline(&self) -> Result<Vec<StudentEnrollment>, StoreError> {
        let mut enrollments: Vec<StudentEnrollment> = self
            .read()?
            .enrollments
            .values()
            .filter(|enrollment| enrollment.deadline.is_some())
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(enrollments)
    }

    async fn mark_reminded(&self, enrollment_id: &str) -> Result<bool, StoreError> {
        let mut arenas = self.write()?;
        let enrollment = arenas.enrollments.get_mut(enrollment_id).ok_or(StoreError::NotFound)?;
        if enrollment.reminder_sent {
            return Ok(false);
        }
        enrollment.reminder_sent = true;
        enrollment.updated_at = primitive_now_utc();
        Ok(true)
    }

    async fn set_deadline(
        &self,
        enrollment_id: &str,
        deadline: Option<PrimitiveDateTime>,
    ) -> Result<(), StoreError> {
        let mut arenas = self.write()?;
        let enrollment = arenas.enrollments.get_mut(enrollment_id).ok_or(StoreError::NotFound)?;
        enrollment.deadline = deadline;
        enrollment.reminder_sent = false;
        enrollment.updated_at = primitive_now_utc();
        Ok(())
    }
}

#[async_trait]
impl AnswerStore for MemoryStore {
    async fn answers_for(
        &self,
        student_id: &str,
        instance_id: &str,
    ) -> Result<Vec<AnswerRecord>, StoreError> {
        Ok(self
            .read()?
            .answers
            .iter()
            .filter(|record| record.student_id == student_id && record.instance_id == instance_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn get_student(&self, student_id: &str) -> Result<Student, StoreError> {
        self.read()?.students.get(student_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn members_of(&self, group_id: &str) -> Result<Vec<GroupMembership>, StoreError> {
        Ok(self
            .read()?
            .memberships
            .iter()
            .filter(|membership| membership.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn membership_for(
        &self,
        group_id: &str,
        student_id: &str,
    ) -> Result<GroupMembership, StoreError> {
        self.read()?
            .memberships
            .iter()
            .find(|membership| {
                membership.group_id == group_id && membership.student_id == student_id
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn create_notification(
        &self,
        student_id: &str,
        kind: NotificationKind,
        link: &str,
    ) -> Result<String, StoreError> {
        let mut arenas = self.write()?;
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            kind,
            link: link.to_string(),
            created_at: primitive_now_utc(),
        };
        let id = notification.id.clone();
        arenas.notifications.push(notification);
        Ok(id)
    }
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn insert_student(&self, username: &str, email: &str) -> Student {
        let student = Student {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
        };
        self.arenas.write().expect("lock").students.insert(student.id.clone(), student.clone());
        student
    }

    pub(crate) fn insert_template(
        &self,
        title: &str,
        questions: Vec<Question>,
    ) -> AssignmentTemplate {
        let mut arenas = self.arenas.write().expect("lock");
        let template = AssignmentTemplate {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            question_ids: questions.iter().map(|question| question.id.clone()).collect(),
            created_at: primitive_now_utc(),
        };
        for question in questions {
            arenas.questions.insert(question.id.clone(), question);
        }
        arenas.templates.insert(template.id.clone(), template.clone());
        template
    }

    pub(crate) fn insert_instance(
        &self,
        template: &AssignmentTemplate,
        group_id: &str,
    ) -> AssignmentInstance {
        let now = primitive_now_utc();
        let instance = AssignmentInstance {
            id: Uuid::new_v4().to_string(),
            template_id: template.id.clone(),
            group_id: group_id.to_string(),
            order: crate::services::ordering::identity_order(template.question_ids.len()),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.arenas.write().expect("lock").instances.insert(instance.id.clone(), instance.clone());
        instance
    }

    pub(crate) fn insert_enrollment(
        &self,
        student_id: &str,
        instance_id: &str,
        deadline: Option<PrimitiveDateTime>,
        reminder_lead_days: i64,
        remind_every_day: bool,
        remind_day_before: bool,
    ) -> StudentEnrollment {
        let now = primitive_now_utc();
        let enrollment = StudentEnrollment {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            instance_id: instance_id.to_string(),
            deadline,
            reminder_lead_days,
            remind_every_day,
            remind_day_before,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };
        self.arenas
            .write()
            .expect("lock")
            .enrollments
            .insert(enrollment.id.clone(), enrollment.clone());
        enrollment
    }

    pub(crate) fn insert_membership(
        &self,
        group_id: &str,
        student_id: &str,
        receive_emails: bool,
    ) -> GroupMembership {
        let membership = GroupMembership {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            student_id: student_id.to_string(),
            receive_emails,
        };
        self.arenas.write().expect("lock").memberships.push(membership.clone());
        membership
    }

    pub(crate) fn upsert_answer(
        &self,
        student_id: &str,
        instance_id: &str,
        question_id: &str,
        first_choice: i32,
        second_choice: Option<i32>,
    ) -> AnswerRecord {
        let mut arenas = self.arenas.write().expect("lock");
        if let Some(existing) = arenas.answers.iter_mut().find(|record| {
            record.student_id == student_id
                && record.instance_id == instance_id
                && record.question_id == question_id
        }) {
            existing.first_choice = first_choice;
            existing.second_choice = second_choice;
            return existing.clone();
        }
        let record = AnswerRecord {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            instance_id: instance_id.to_string(),
            question_id: question_id.to_string(),
            first_choice,
            second_choice,
            created_at: primitive_now_utc(),
        };
        arenas.answers.push(record.clone());
        record
    }

    pub(crate) fn instance(&self, instance_id: &str) -> Option<AssignmentInstance> {
        self.arenas.read().expect("lock").instances.get(instance_id).cloned()
    }

    pub(crate) fn enrollment(&self, enrollment_id: &str) -> Option<StudentEnrollment> {
        self.arenas.read().expect("lock").enrollments.get(enrollment_id).cloned()
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.arenas.read().expect("lock").notifications.clone()
    }
}
