// src/control.rs
// =============================================================================
// Lets an operator steer a running crawl with OS signals.
//
//   SIGUSR1          -> raise the depth ceiling by 10
//   SIGINT / SIGTERM -> stop the crawl gracefully
//
// On platforms without unix signals only Ctrl-C is supported.
//
// The crawl engine knows nothing about signals: this module only talks to
// the DepthGovernor and the shutdown CancellationToken the Crawler hands out.
// =============================================================================

use depth_crawler::DepthGovernor;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// How much one SIGUSR1 raises the depth ceiling
pub const DEPTH_STEP: usize = 10;

// Starts listening for signals in the background
//
// The listener exits on its own once `shutdown` is cancelled, whoever
// cancelled it.
pub fn spawn_signal_listener(
    governor: Arc<DepthGovernor>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = listen(&governor, &shutdown).await {
            tracing::warn!("could not install signal handlers: {}", e);
        }
    })
}

#[cfg(unix)]
async fn listen(governor: &DepthGovernor, shutdown: &CancellationToken) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut extend = signal(SignalKind::user_defined1())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            _ = extend.recv() => {
                tracing::info!("got signal SIGUSR1");
                governor.increase(DEPTH_STEP);
            }
            _ = interrupt.recv() => {
                tracing::info!("got signal SIGINT, stopping");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("got signal SIGTERM, stopping");
                break;
            }
        }
    }

    shutdown.cancel();
    Ok(())
}

#[cfg(not(unix))]
async fn listen(_governor: &DepthGovernor, shutdown: &CancellationToken) -> std::io::Result<()> {
    tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        result = tokio::signal::ctrl_c() => result?,
    }

    tracing::info!("got Ctrl-C, stopping");
    shutdown.cancel();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_exits_when_crawl_is_shut_down() {
        let governor = Arc::new(DepthGovernor::new(3));
        let shutdown = CancellationToken::new();
        let listener = spawn_signal_listener(Arc::clone(&governor), shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(2), listener)
            .await
            .expect("listener should stop")
            .unwrap();
        assert_eq!(governor.read(), 3);
    }
}
