//! Concurrency limiting and response-time based pacing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::context::RequestContext;
use crate::error::Result;

/// Smoothing factor for the response-time moving average.
const EMA_ALPHA: f64 = 0.2;

/// Settings that keep the client polite towards the Jamf Pro server.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Maximum in-flight requests. `None` means unbounded.
    pub max_concurrent_requests: Option<usize>,
    /// Pause after every successful response.
    pub mandatory_request_delay: Duration,
    /// Upper bound for the adaptive pause after a slow response.
    pub adaptive_delay_max: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: None,
            mandatory_request_delay: Duration::ZERO,
            adaptive_delay_max: Duration::from_secs(10),
        }
    }
}

/// Exponential moving average of response times.
///
/// A response much slower than the average suggests the server is under
/// load, so the caller backs off by the excess.
#[derive(Debug, Default)]
pub struct ResponseTimeTracker {
    average: Mutex<Option<f64>>,
}

impl ResponseTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample and return how long to pause before the next request.
    pub fn record(&self, sample: Duration, max_delay: Duration) -> Duration {
        let secs = sample.as_secs_f64();
        let mut average = self.average.lock().unwrap_or_else(|e| e.into_inner());

        let ema = match *average {
            None => {
                *average = Some(secs);
                return Duration::ZERO;
            }
            Some(prev) => EMA_ALPHA * secs + (1.0 - EMA_ALPHA) * prev,
        };
        *average = Some(ema);

        if secs <= 2.0 * ema {
            return Duration::ZERO;
        }
        std::cmp::min(Duration::from_secs_f64(secs - ema), max_delay)
    }

    /// Current average, if any sample was recorded.
    pub fn average(&self) -> Option<Duration> {
        self.average
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(Duration::from_secs_f64)
    }
}

/// Shared pacing state for one transport.
#[derive(Debug)]
pub(crate) struct Throttle {
    config: ThrottleConfig,
    semaphore: Option<Arc<Semaphore>>,
    tracker: ResponseTimeTracker,
}

impl Throttle {
    pub(crate) fn new(config: ThrottleConfig) -> Self {
        let semaphore = config
            .max_concurrent_requests
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        Self {
            config,
            semaphore,
            tracker: ResponseTimeTracker::new(),
        }
    }

    /// Wait for a concurrency slot. The permit is held until dropped.
    pub(crate) async fn acquire(&self, ctx: &RequestContext) -> Result<Option<OwnedSemaphorePermit>> {
        let Some(semaphore) = &self.semaphore else {
            return Ok(None);
        };
        let semaphore = Arc::clone(semaphore);
        ctx.run(async move {
            semaphore
                .acquire_owned()
                .await
                .map(Some)
                .map_err(|e| crate::Error::with_source(crate::ErrorKind::Other(e.to_string()), e))
        })
        .await
    }

    /// Pause after a successful response. Cancellation only cuts the pause
    /// short; the response has already been received.
    pub(crate) async fn after_success(&self, ctx: &RequestContext, elapsed: Duration) {
        let adaptive = self.tracker.record(elapsed, self.config.adaptive_delay_max);
        let pause = self.config.mandatory_request_delay + adaptive;
        if pause.is_zero() {
            return;
        }
        debug!(pause_ms = pause.as_millis() as u64, "Pacing before next request");
        if ctx.sleep(pause).await.is_err() {
            debug!("Pacing interrupted by cancellation");
        }
    }
}
