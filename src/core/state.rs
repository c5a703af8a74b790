use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::email::EmailSink;
use crate::store::EngineStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: EngineStore,
    mailer: Arc<dyn EmailSink>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, store: EngineStore, mailer: Arc<dyn EmailSink>) -> Self {
        Self { inner: Arc::new(InnerState { settings, store, mailer }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &EngineStore {
        &self.inner.store
    }

    pub(crate) fn mailer(&self) -> Arc<dyn EmailSink> {
        self.inner.mailer.clone()
    }
}
