pub mod domain;
pub mod services;
pub mod store;

pub(crate) mod core;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::store::EngineStore;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let store = EngineStore::in_memory();
    let mailer = services::email::mailer_from_settings(&settings)?;
    let state = AppState::new(settings, store, mailer);

    tracing::info!(
        environment = %state.settings().runtime().environment.as_str(),
        interval_seconds = state.settings().scheduler().reminder_interval_seconds,
        "PeerTrack progress engine starting"
    );

    tasks::scheduler::run(state).await
}
