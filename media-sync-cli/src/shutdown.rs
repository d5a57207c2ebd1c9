//! Signal handling.
//!
//! The first SIGINT (Ctrl+C) or SIGTERM ends the run. Records already created
//! stay in the store; nothing is rolled back.

use anyhow::Result;
use std::future::Future;

/// Exit code for a run interrupted by a signal
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Resolve when the process is asked to stop.
///
/// If the handlers cannot be installed the run is left uninterruptible
/// instead of being aborted.
pub async fn shutdown_requested() {
    until_signal(wait_for_signal()).await
}

async fn until_signal<F>(signal: F)
where
    F: Future<Output = Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "Signal handling unavailable, continuing without it");
        std::future::pending::<()>().await;
    }
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
