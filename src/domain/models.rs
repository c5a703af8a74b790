use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::domain::types::NotificationKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub correct_choices: Vec<i32>,
}

impl Question {
    pub fn is_correct(&self, choice: i32) -> bool {
        self.correct_choices.contains(&choice)
    }
}

/// Immutable-once-published question list authored by an instructor. The
/// engine only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentTemplate {
    pub id: String,
    pub title: String,
    pub question_ids: Vec<String>,
    pub created_at: PrimitiveDateTime,
}

/// One distribution of a template to a student group. `order` is always a
/// permutation of `[0, n)` over the template's questions; `version` guards
/// concurrent order updates (compare-and-set in the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentInstance {
    pub id: String,
    pub template_id: String,
    pub group_id: String,
    pub order: Vec<usize>,
    pub version: u64,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

/// Links a student to an assignment instance. `reminder_sent` only ever
/// transitions false→true from this engine; a due-date change resets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEnrollment {
    pub id: String,
    pub student_id: String,
    pub instance_id: String,
    pub deadline: Option<PrimitiveDateTime>,
    pub reminder_lead_days: i64,
    pub remind_every_day: bool,
    pub remind_day_before: bool,
    pub reminder_sent: bool,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

/// One attempt row per (student, instance, question). Read-only here; the
/// answer-submission flow lives outside this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub student_id: String,
    pub instance_id: String,
    pub question_id: String,
    pub first_choice: i32,
    pub second_choice: Option<i32>,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: String,
    pub group_id: String,
    pub student_id: String,
    pub receive_emails: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub student_id: String,
    pub kind: NotificationKind,
    pub link: String,
    pub created_at: PrimitiveDateTime,
}
