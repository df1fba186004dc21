use crate::shared::error::ScanError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Awaits `fut` unless `token` is cancelled first.
///
/// Every network call in the pipeline goes through here so that a cancelled
/// run stops at the next call boundary instead of draining the whole queue.
pub async fn until_cancelled<T, F>(token: &CancellationToken, fut: F) -> Result<T, ScanError>
where
    F: Future<Output = Result<T, ScanError>>,
{
    if token.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ScanError::Cancelled),
        result = fut => result,
    }
}
