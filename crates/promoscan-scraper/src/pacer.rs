//! Request pacing for outbound calls to merchant sites.
//!
//! Every outbound request (both login steps and the bonus sync) is preceded
//! by a randomized delay drawn uniformly from the configured bounds. Pacing
//! state is scoped per host: [`HostPacers`] hands out one [`Pacer`] per site
//! authority so parallel workers throttle each remote site independently
//! rather than the client as a whole.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Number of request instants each pacer remembers.
pub const WINDOW_CAPACITY: usize = 200;

/// Inclusive `[min, max]` bounds for the pre-request delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingBounds {
    min: Duration,
    max: Duration,
}

impl PacingBounds {
    /// Builds bounds from seconds. Negative or non-finite inputs become zero,
    /// values too large for a `Duration` saturate at `Duration::MAX`, and
    /// reversed bounds are swapped.
    #[must_use]
    pub fn from_secs(min_secs: f64, max_secs: f64) -> Self {
        let clean = |secs: f64| {
            if secs.is_finite() && secs > 0.0 {
                Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
            } else {
                Duration::ZERO
            }
        };
        let (a, b) = (clean(min_secs), clean(max_secs));
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Constant delay: `min == max == delay`.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// No delay at all.
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws one delay uniformly from the bounds.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::rng().random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::try_from_secs_f64(secs).map_or(self.max, |d| d.clamp(self.min, self.max))
    }
}

/// Fixed-capacity, time-ordered record of recent request instants.
///
/// Eviction happens on insert: pushing into a full window drops the oldest
/// entry, so the window never holds more than its capacity.
#[derive(Debug, Clone)]
pub struct RequestTimestampWindow {
    capacity: usize,
    instants: VecDeque<Instant>,
}

impl RequestTimestampWindow {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            instants: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, at: Instant) {
        if self.instants.len() == self.capacity {
            self.instants.pop_front();
        }
        self.instants.push_back(at);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn latest(&self) -> Option<Instant> {
        self.instants.back().copied()
    }

    /// Counts recorded requests no older than `span` relative to `now`.
    #[must_use]
    pub fn requests_within(&self, now: Instant, span: Duration) -> usize {
        self.instants
            .iter()
            .rev()
            .take_while(|at| now.saturating_duration_since(**at) <= span)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.instants.iter()
    }
}

/// Pacer for a single host.
///
/// The timestamp window lives behind an async mutex that is held for the
/// whole delay, so concurrent callers for the same host queue up behind
/// each other instead of sleeping in parallel.
#[derive(Debug)]
pub struct Pacer {
    bounds: PacingBounds,
    window: tokio::sync::Mutex<RequestTimestampWindow>,
}

impl Pacer {
    #[must_use]
    pub fn new(bounds: PacingBounds) -> Self {
        Self::with_capacity(bounds, WINDOW_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(bounds: PacingBounds, capacity: usize) -> Self {
        Self {
            bounds,
            window: tokio::sync::Mutex::new(RequestTimestampWindow::new(capacity)),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> PacingBounds {
        self.bounds
    }

    /// Suspends the caller for a delay sampled from the bounds.
    pub async fn wait(&self) {
        let _slot = self.window.lock().await;
        tokio::time::sleep(self.bounds.sample()).await;
    }

    /// Appends the current instant to the window.
    pub async fn record_attempt(&self) {
        self.window.lock().await.push(Instant::now());
    }

    /// Waits, then records the attempt, without letting another caller for
    /// the same host slip in between. Call immediately before each request.
    pub async fn pace(&self) {
        let mut window = self.window.lock().await;
        let delay = self.bounds.sample();
        tracing::trace!(delay_ms = delay.as_millis(), "pacing outbound request");
        tokio::time::sleep(delay).await;
        window.push(Instant::now());
    }

    /// Copy of the current window for telemetry.
    pub async fn snapshot(&self) -> RequestTimestampWindow {
        self.window.lock().await.clone()
    }
}

/// Lazily created [`Pacer`]s keyed by site authority (`host[:port]`).
#[derive(Debug)]
pub struct HostPacers {
    bounds: PacingBounds,
    pacers: Mutex<HashMap<String, Arc<Pacer>>>,
}

impl HostPacers {
    #[must_use]
    pub fn new(bounds: PacingBounds) -> Self {
        Self {
            bounds,
            pacers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the pacer for `authority`, creating it on first use.
    #[must_use]
    pub fn for_host(&self, authority: &str) -> Arc<Pacer> {
        let mut pacers = self.pacers.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            pacers
                .entry(authority.to_ascii_lowercase())
                .or_insert_with(|| Arc::new(Pacer::new(self.bounds))),
        )
    }

    /// Number of hosts that have been paced so far.
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.pacers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
