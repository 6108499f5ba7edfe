//! Repeated-call timing for comparing transfer modes

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Wall-clock timings from a [`measure`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingReport {
    pub iterations: u32,
    pub total: Duration,
    pub average: Duration,
}

/// Run `operation` once to warm up connections, then `iterations` more times
/// under the clock. The first error aborts the run.
pub async fn measure<F, Fut, T>(iterations: u32, mut operation: F) -> Result<TimingReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    operation().await?;

    let started = Instant::now();
    for _ in 0..iterations {
        operation().await?;
    }
    let total = started.elapsed();

    let average = if iterations == 0 {
        Duration::ZERO
    } else {
        total / iterations
    };

    tracing::info!(
        "Elapsed {:?} for {} calls, {:?} on average",
        total,
        iterations,
        average
    );

    Ok(TimingReport {
        iterations,
        total,
        average,
    })
}
