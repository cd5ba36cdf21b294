use crate::error::EmbedError;
use std::future::Future;
use tracing::debug;

/// Runs `worker` over `items` in consecutive windows of `concurrency`.
///
/// Every worker in a window is spawned before any is awaited; the next
/// window starts only after the whole window has settled. A failed worker
/// does not cancel its in-flight siblings, but no further window starts
/// once one has failed. The first failure (in window order) is returned.
///
/// This bounds peak concurrent work to `concurrency` regardless of the
/// total item count.
pub async fn process_in_windows<T, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    worker: F,
) -> Result<(), EmbedError>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), EmbedError>> + Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut remaining = items.into_iter();

    loop {
        let window: Vec<T> = remaining.by_ref().take(concurrency).collect();
        if window.is_empty() {
            return Ok(());
        }
        debug!(window_size = window.len(), "starting extraction window");

        let handles: Vec<_> = window
            .into_iter()
            .map(|item| tokio::spawn(worker(item)))
            .collect();

        let mut first_failure = None;
        for handle in handles {
            let settled = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(EmbedError::TaskJoin(join_error.to_string())),
            };
            if let Err(error) = settled {
                if first_failure.is_none() {
                    first_failure = Some(error);
                }
            }
        }

        if let Some(error) = first_failure {
            return Err(error);
        }
    }
}
