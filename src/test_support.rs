use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use time::{Duration, PrimitiveDateTime};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::models::{AnswerRecord, AssignmentInstance, Question};
use crate::services::email::{EmailError, EmailSink};
use crate::store::memory::MemoryStore;
use crate::store::EngineStore;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) mailer: Arc<RecordingMailer>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<AsyncMutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(AsyncMutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("PEERTRACK_ENV", "test");
    std::env::set_var("PEERTRACK_STRICT_CONFIG", "0");
    std::env::set_var("REMINDER_INTERVAL_SECONDS", "3600");
    std::env::set_var("EMAIL_ENABLED", "0");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

/// A memory-backed `EngineStore` plus the concrete handle for seeding.
pub(crate) fn engine_store() -> (EngineStore, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (EngineStore::from_memory(store.clone()), store)
}

pub(crate) async fn setup_state() -> TestContext {
    let guard = env_lock().await;
    set_test_env();
    let settings = Settings::load().expect("settings");
    drop(guard);

    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(settings, EngineStore::from_memory(store.clone()), mailer.clone());
    TestContext { state, store, mailer }
}

/// Questions `q0..qN`, each with choice 0 as the correct one.
pub(crate) fn sample_questions(count: usize) -> Vec<Question> {
    (0..count)
        .map(|index| Question {
            id: format!("q{index}"),
            title: format!("Question {}", index + 1),
            correct_choices: vec![0],
        })
        .collect()
}

/// Template "Peer Quiz 1" with `question_count` sample questions plus one
/// instance for `group-1`, in identity order.
pub(crate) fn seed_assignment(store: &MemoryStore, question_count: usize) -> AssignmentInstance {
    let template = store.insert_template("Peer Quiz 1", sample_questions(question_count));
    store.insert_instance(&template, "group-1")
}

pub(crate) fn deadline_in_days(days: i64) -> PrimitiveDateTime {
    primitive_now_utc() + Duration::days(days)
}

pub(crate) fn answer_record(
    student_id: &str,
    instance_id: &str,
    question_id: &str,
    first_choice: i32,
    second_choice: Option<i32>,
) -> AnswerRecord {
    AnswerRecord {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        instance_id: instance_id.to_string(),
        question_id: question_id.to_string(),
        first_choice,
        second_choice,
        created_at: primitive_now_utc(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SentEmail {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

/// Email sink that records instead of sending; flip `set_failing` to
/// simulate an SMTP outage.
#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl EmailSink for RecordingMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::Transport("simulated smtp outage".to_string()));
        }
        self.sent.lock().expect("lock").push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
