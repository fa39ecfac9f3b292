//! Bounded quiescence wait for freshly loaded pages.
//!
//! A page that fires its load event may still be mutating: deferred
//! scripts, XHR-driven rendering, lazy-loaded fragments. Instead of
//! sleeping a fixed grace period, the document is sampled at a fixed
//! interval and counts as settled once two consecutive samples are
//! identical. A budget caps the wait — a page that never goes quiet is
//! captured as-is once the budget elapses, which degrades to exactly the
//! fixed-delay behavior.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use loadhtml_core::settle::{self, SettleConfig};
//!
//! # async fn run() {
//! let config = SettleConfig::new(Duration::from_secs(2));
//! let outcome = settle::wait_for_quiescence(
//!     || async { Ok::<usize, loadhtml_core::AppError>(42) },
//!     &config,
//! )
//! .await;
//! # }
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::AppError;

/// Configuration for the quiescence wait.
#[derive(Debug, Clone)]
pub struct SettleConfig {
    /// Upper bound on the total wait.
    pub budget: Duration,

    /// Delay between consecutive document samples.
    pub interval: Duration,
}

impl SettleConfig {
    /// Create a new config with the given budget and the default
    /// sampling interval.
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            interval: Duration::from_millis(100),
        }
    }

    /// Override the sampling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for SettleConfig {
    /// 2 second budget, 100ms sampling interval. The budget matches the
    /// grace period that pages driven by deferred scripts typically need.
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(2),
            interval: Duration::from_millis(100),
        }
    }
}

/// How a quiescence wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Two consecutive samples were identical.
    Quiet,
    /// The budget elapsed before the document went quiet.
    BudgetExhausted,
}

/// Sample `probe` every [`SettleConfig::interval`] until two consecutive
/// samples compare equal or the budget runs out.
///
/// Probe errors are logged and treated as "still moving": they reset the
/// comparison (an error between two identical samples must not count as
/// quiescence) and never abort the wait.
pub async fn wait_for_quiescence<P, Fut, T>(mut probe: P, config: &SettleConfig) -> Settle
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    T: PartialEq,
{
    let deadline = Instant::now() + config.budget;
    let mut last: Option<T> = None;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Settle::BudgetExhausted;
        }
        tokio::time::sleep(config.interval.min(remaining)).await;

        match probe().await {
            Ok(sample) => {
                if last.as_ref() == Some(&sample) {
                    return Settle::Quiet;
                }
                last = Some(sample);
            }
            Err(err) => {
                tracing::debug!("Settle probe failed: {err}");
                last = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_config() -> SettleConfig {
        SettleConfig::new(Duration::from_millis(100)).with_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn stable_document_settles_before_budget() {
        let start = Instant::now();
        let outcome = wait_for_quiescence(|| async { Ok::<usize, AppError>(1234) }, &fast_config())
            .await;

        assert_eq!(outcome, Settle::Quiet);
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "Quiet page should settle before the budget, elapsed: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn mutating_document_runs_the_full_budget() {
        let counter = AtomicUsize::new(0);
        let config = fast_config();

        let start = Instant::now();
        let outcome = wait_for_quiescence(
            || {
                let sample = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<usize, AppError>(sample) }
            },
            &config,
        )
        .await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, Settle::BudgetExhausted);
        assert!(
            elapsed >= config.budget,
            "A never-quiet page must be waited on for the whole budget, elapsed: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn zero_budget_skips_the_wait_entirely() {
        let config = SettleConfig::new(Duration::ZERO);
        let outcome =
            wait_for_quiescence(|| async { Ok::<usize, AppError>(1) }, &config).await;
        assert_eq!(outcome, Settle::BudgetExhausted);
    }

    #[tokio::test]
    async fn failing_probe_never_settles() {
        let outcome = wait_for_quiescence(
            || async { Err::<usize, _>(AppError::Generic("probe broke".into())) },
            &fast_config(),
        )
        .await;

        assert_eq!(outcome, Settle::BudgetExhausted);
    }

    #[tokio::test]
    async fn error_between_identical_samples_resets_comparison() {
        // Ok(7), Err, Ok(7): the error must prevent the second Ok(7) from
        // counting as two consecutive identical samples.
        let counter = AtomicUsize::new(0);
        let config =
            SettleConfig::new(Duration::from_millis(40)).with_interval(Duration::from_millis(10));

        let outcome = wait_for_quiescence(
            || {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 1 {
                        Err(AppError::Generic("flaky probe".into()))
                    } else {
                        Ok::<usize, AppError>(7)
                    }
                }
            },
            &config,
        )
        .await;

        // The third call (Ok(7) after the error) starts a fresh pair; only
        // the fourth call may settle it.
        if outcome == Settle::Quiet {
            assert!(counter.load(Ordering::SeqCst) >= 4);
        }
    }
}
