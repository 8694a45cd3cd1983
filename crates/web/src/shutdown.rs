//! Control loop that keeps the process alive until an exit is requested.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `/api/exit` was called.
    Requested,
    /// The process received Ctrl-C.
    Interrupted,
}

/// Checks `exit` every `poll_interval` and returns once it is cancelled.
///
/// Ctrl-C cancels `exit` as well, so everything watching the token stops in both cases.
pub async fn wait_for_exit(exit: &CancellationToken, poll_interval: Duration) -> ExitReason {
    let mut ticker = tokio::time::interval(poll_interval);
    let interrupted = interrupted();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if exit.is_cancelled() {
                    info!("exit requested");
                    return ExitReason::Requested;
                }
            }
            () = &mut interrupted => {
                info!("interrupted");
                exit.cancel();
                return ExitReason::Interrupted;
            }
        }
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(cause = %e, "can't listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_after_exit_request() {
        let exit = CancellationToken::new();
        let requester = exit.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            requester.cancel();
        });

        let reason = tokio::time::timeout(Duration::from_secs(5), wait_for_exit(&exit, Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(reason, ExitReason::Requested);
    }

    #[tokio::test]
    async fn keeps_polling_until_cancelled() {
        let exit = CancellationToken::new();
        let waiting = wait_for_exit(&exit, Duration::from_millis(10));
        tokio::pin!(waiting);

        assert!(tokio::time::timeout(Duration::from_millis(100), &mut waiting).await.is_err());

        exit.cancel();
        assert_eq!(waiting.await, ExitReason::Requested);
    }
}
