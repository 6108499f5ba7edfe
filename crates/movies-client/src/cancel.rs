//! Cancellation and deadlines for in-flight operations

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, CancelReason, Result};

/// Run `work` until it completes, `token` fires or `deadline` elapses.
///
/// The token is polled first, so an already-cancelled token wins without
/// `work` ever being polled. Dropping `work` releases whatever it holds.
pub async fn cancellable<F, T>(
    token: Option<&CancellationToken>,
    deadline: Option<Duration>,
    work: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let bounded = async {
        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, work)
                .await
                .map_err(|_| ApiError::Cancelled(CancelReason::DeadlineElapsed))?,
            None => work.await,
        }
    };

    match token {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => Err(ApiError::Cancelled(CancelReason::Requested)),
                result = bounded => result,
            }
        }
        None => bounded.await,
    }
}

/// End a body stream as soon as `token` fires.
pub(crate) fn guard_stream<S, E>(
    stream: S,
    token: Option<CancellationToken>,
) -> BoxStream<'static, std::result::Result<Bytes, E>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: 'static,
{
    match token {
        Some(token) => stream.take_until(token.cancelled_owned()).boxed(),
        None => stream.boxed(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_completes_without_token() {
        let result = cancellable(None, None, async { Ok(7) }).await;
        assert_eq!(result.expect("Operation should succeed"), 7);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_work() {
        let token = CancellationToken::new();
        token.cancel();
        let polled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&polled);

        let result: Result<()> = cancellable(Some(&token), None, async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Cancelled(CancelReason::Requested))
        ));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result: Result<()> = cancellable(Some(&token), None, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Cancelled(CancelReason::Requested))
        ));
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let result: Result<()> = cancellable(None, Some(Duration::from_millis(50)), async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Cancelled(CancelReason::DeadlineElapsed))
        ));
    }

    #[tokio::test]
    async fn test_work_error_passes_through() {
        let token = CancellationToken::new();
        let result: Result<()> = cancellable(Some(&token), None, async {
            Err(ApiError::AccessDenied)
        })
        .await;
        assert!(matches!(result, Err(ApiError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_guard_stream_stops_on_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let chunks = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(b"a"))]);
        let collected: Vec<_> = guard_stream(chunks, Some(token)).collect().await;
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn test_guard_stream_passes_through() {
        let chunks = stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
        ]);
        let collected: Vec<_> = guard_stream(chunks, None).collect().await;
        assert_eq!(collected.len(), 2);
    }
}
