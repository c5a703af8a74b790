use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{interval, Duration};

use crate::core::state::AppState;
use crate::tasks::reminders;

/// Supervise the reminder loop until the process receives a shutdown
/// signal, then broadcast and join so no timer outlives the process.
pub(crate) async fn run(state: AppState) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles = Vec::with_capacity(1);
    handles.push(tokio::spawn(reminder_loop(state.clone(), shutdown_rx)));

    crate::core::shutdown::shutdown_signal().await;
    if shutdown_tx.send(true).is_err() {
        tracing::warn!("Failed to broadcast shutdown signal to background tasks");
    }

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Background task join failed");
        }
    }

    Ok(())
}

async fn reminder_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_secs(state.settings().scheduler().reminder_interval_seconds);
    let mut tick = interval(period);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let Err(err) = reminders::run_reminder_sweep(&state).await {
                    tracing::error!(error = %err, "run_reminder_sweep failed");
                }
            }
        }
    }
}
