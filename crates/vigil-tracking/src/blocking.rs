//! Store work off the async runtime.

use tracing::Span;

use crate::errors::Result;

/// Run `work` on tokio's blocking pool, inside the caller's span.
///
/// Every rusqlite call can wait on `busy_timeout` or a pool checkout. That
/// wait must not sit on a runtime worker thread.
pub(crate) async fn run<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work)).await?
}
