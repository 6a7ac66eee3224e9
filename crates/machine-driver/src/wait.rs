//! Fixed-schedule status polling.
//!
//! Sequential sleep-and-repoll with a fixed attempt count and interval.
//! No backoff, no jitter, no cancellation.

use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// One probe outcome in a polling loop.
pub enum Probe<T> {
    /// Target state reached.
    Done(T),
    /// Not there yet; sleep and probe again.
    Pending,
}

/// Polling schedule. The defaults match the provider's slow server
/// transitions: 10 attempts, one minute apart.
#[derive(Debug, Clone)]
pub struct WaitOpts {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for WaitOpts {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(60),
        }
    }
}

/// Run `probe` until it resolves, up to `opts.max_attempts` times with a
/// fixed sleep in between. A probe error is terminal and aborts
/// immediately; exhausting the attempts is a timeout.
pub async fn wait_for<T, F, Fut>(waiting_for: &str, opts: &WaitOpts, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    for attempt in 1..=opts.max_attempts {
        match probe().await? {
            Probe::Done(value) => return Ok(value),
            Probe::Pending => {
                tracing::debug!(attempt, max = opts.max_attempts, waiting_for, "still waiting");
                if attempt < opts.max_attempts {
                    tokio::time::sleep(opts.interval).await;
                }
            }
        }
    }

    Err(Error::Timeout {
        attempts: opts.max_attempts,
        waiting_for: waiting_for.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> WaitOpts {
        WaitOpts {
            max_attempts,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn resolves_once_probe_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let got = wait_for("test value", &fast(5), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) >= 2 {
                    Ok::<_, Error>(Probe::Done(7))
                } else {
                    Ok(Probe::Pending)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(got, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_time_out() {
        let err = wait_for("server status", &fast(3), || async {
            Ok::<Probe<()>, Error>(Probe::Pending)
        })
        .await
        .unwrap_err();

        match err {
            Error::Timeout { attempts, waiting_for } => {
                assert_eq!(attempts, 3);
                assert_eq!(waiting_for, "server status");
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn probe_error_is_terminal() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = wait_for("anything", &fast(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<Probe<()>, _>(Error::Server("frozen".into()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Server(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
