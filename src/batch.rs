use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{LetterboxError, LetterboxResult};

/// Run `transform` over `items` with at most `ceiling` invocations in flight.
///
/// This is the whole batch engine:
///
/// - **Admission** is FIFO: items are admitted in list order as slots free
///   up, and the number of concurrently executing transforms never exceeds
///   `ceiling`.
/// - **Failures** fail fast for future admissions: the first failure observed
///   (in completion order) becomes the return value, items not yet admitted
///   are not started, and items already in flight run to completion before
///   this function returns. Secondary failures are logged and discarded.
/// - **Cancellation** is cooperative: cancelling `cancel` stops further
///   admissions (including an admission currently waiting for a slot) and
///   returns [`LetterboxError::Cancelled`] once in-flight work drains.
///   In-flight transforms are never interrupted mid-operation.
///
/// `transform` runs on the blocking thread pool, so it may do synchronous
/// I/O and CPU-heavy work. It must be safe to invoke concurrently for
/// independent items.
pub async fn run_batch<I, F>(
    items: Vec<I>,
    ceiling: usize,
    cancel: &CancellationToken,
    transform: F,
) -> LetterboxResult<()>
where
    I: Send + 'static,
    F: Fn(I) -> LetterboxResult<()> + Send + Sync + 'static,
{
    if ceiling == 0 {
        return Err(LetterboxError::config("concurrency ceiling must be at least 1"));
    }
    if items.is_empty() {
        return Ok(());
    }

    let semaphore = Arc::new(Semaphore::new(ceiling));
    let transform = Arc::new(transform);
    let first_error: Arc<Mutex<Option<LetterboxError>>> = Arc::new(Mutex::new(None));
    let mut workers: JoinSet<()> = JoinSet::new();
    let mut cancelled = false;

    for item in items {
        // Admission: wait for a slot, unless cancellation preempts it.
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cancelled = true;
                break;
            }
            permit = Arc::clone(&semaphore).acquire_owned() => {
                match permit {
                    Ok(permit) => permit,
                    // The semaphore is never closed.
                    Err(_) => break,
                }
            }
        };

        // A recorded failure stops future admissions.
        if first_error.lock().await.is_some() {
            break;
        }

        let transform = Arc::clone(&transform);
        let first_error = Arc::clone(&first_error);
        workers.spawn(async move {
            let _permit = permit;
            let result = tokio::task::spawn_blocking(move || (*transform)(item)).await;
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(join_error) => Err(LetterboxError::Other(anyhow::anyhow!(
                    "transform task panicked: {join_error}"
                ))),
            };
            if let Err(err) = outcome {
                let mut slot = first_error.lock().await;
                if slot.is_none() {
                    *slot = Some(err);
                } else {
                    warn!(error = %err, "discarding error after the first failure");
                }
            }
        });
    }

    // Drain: every admitted item runs to completion before we return.
    while workers.join_next().await.is_some() {}

    if let Some(err) = first_error.lock().await.take() {
        return Err(err);
    }
    if cancelled {
        return Err(LetterboxError::Cancelled);
    }
    Ok(())
}
