//! Background fetching on a fixed interval.
//!
//! A [`Poller`] fetches immediately, then on every tick until its
//! [`PollHandle`] is stopped or dropped. The latest value, the in-flight
//! count and the last error are published through a `watch` channel.
//!
//! A manual [`PollHandle::refetch`] is not de-duplicated against a scheduled
//! fetch: when two invocations overlap, whichever finishes last wins.

pub mod sources;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub use sources::{
    MetricsSource, RunListSource, RunSource, WorkflowListSource, WorkflowSource,
    METRICS_POLL_INTERVAL, RUNS_POLL_INTERVAL,
};

/// One remote read that a poller repeats.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;
    type Error: Display + Send + 'static;

    async fn fetch(&self) -> Result<Self::Output, Self::Error>;

    /// Label used in log records.
    fn name(&self) -> &'static str {
        "poll"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollError {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl PollError {
    fn new(message: String) -> Self {
        Self {
            message,
            at: Utc::now(),
        }
    }
}

/// Observable state of a poller.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Last successful result. Survives later failures.
    pub data: Option<T>,
    /// Cleared by the next success.
    pub error: Option<PollError>,
    /// Number of fetches currently running.
    pub in_flight: usize,
    pub last_updated: Option<DateTime<Utc>>,
    /// Bumped once per landed result or error.
    pub updates: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: 0,
            last_updated: None,
            updates: 0,
        }
    }
}

impl<T> PollState<T> {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

type StateTx<F> = Arc<watch::Sender<PollState<<F as Fetcher>::Output>>>;

async fn invoke<F: Fetcher>(fetcher: Arc<F>, state: StateTx<F>, active: Arc<AtomicBool>) {
    if !active.load(Ordering::SeqCst) {
        return;
    }
    state.send_modify(|s| s.in_flight += 1);

    let outcome = fetcher.fetch().await.map_err(|e| e.to_string());

    let live = active.load(Ordering::SeqCst);
    if !live {
        debug!(source = fetcher.name(), "Discarding result of a stopped poller.");
    } else if let Err(message) = &outcome {
        warn!(source = fetcher.name(), error = %message, "Poll failed, keeping last data.");
    }

    state.send_modify(move |s| {
        s.in_flight = s.in_flight.saturating_sub(1);
        if !live {
            return;
        }
        s.updates += 1;
        match outcome {
            Ok(data) => {
                s.data = Some(data);
                s.error = None;
                s.last_updated = Some(Utc::now());
            }
            Err(message) => s.error = Some(PollError::new(message)),
        }
    });
}

struct Schedule<F: Fetcher> {
    fetcher: Arc<F>,
    interval: Option<Duration>,
    active: Arc<AtomicBool>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<F: Fetcher> Schedule<F> {
    fn spawn(fetcher: Arc<F>, interval: Option<Duration>, state: StateTx<F>) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = {
            let fetcher = fetcher.clone();
            let active = active.clone();
            tokio::spawn(async move {
                let period = match interval {
                    Some(period) if !period.is_zero() => period,
                    _ => {
                        tokio::spawn(invoke(fetcher, state, active));
                        return;
                    }
                };

                debug!(source = fetcher.name(), ?period, "Polling started.");
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => {
                            debug!(source = fetcher.name(), "Polling stopped.");
                            break;
                        }
                        _ = ticker.tick() => {
                            tokio::spawn(invoke(fetcher.clone(), state.clone(), active.clone()));
                        }
                    }
                }
            })
        };

        Self {
            fetcher,
            interval,
            active,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(shutdown_tx) = self.shutdown.take() {
            // The one-shot schedule has already returned and dropped its receiver.
            let _ = shutdown_tx.send(());
        }
    }
}

pub struct Poller;

impl Poller {
    /// Starts polling `fetcher`. `None` (or a zero interval) fetches once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F: Fetcher>(fetcher: F, interval: Option<Duration>) -> PollHandle<F> {
        let (state_tx, _) = watch::channel(PollState::default());
        let state = Arc::new(state_tx);
        let schedule = Schedule::spawn(Arc::new(fetcher), interval, state.clone());
        PollHandle { state, schedule }
    }
}

/// Owner of a running poller. Dropping it stops the schedule.
pub struct PollHandle<F: Fetcher> {
    state: StateTx<F>,
    schedule: Schedule<F>,
}

impl<F: Fetcher> PollHandle<F> {
    pub fn state(&self) -> PollState<F::Output> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<F::Output>> {
        self.state.subscribe()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.schedule.interval
    }

    pub fn is_running(&self) -> bool {
        self.schedule.active.load(Ordering::SeqCst)
    }

    /// Fetches now, alongside the schedule. Await the returned handle to
    /// wait for the result to land.
    pub fn refetch(&self) -> JoinHandle<()> {
        tokio::spawn(invoke(
            self.schedule.fetcher.clone(),
            self.state.clone(),
            self.schedule.active.clone(),
        ))
    }

    /// Replaces the fetch operation and interval. The old schedule is
    /// cancelled and the new one fetches immediately; current data is kept
    /// until the new fetcher produces something.
    pub fn reconfigure(&mut self, fetcher: F, interval: Option<Duration>) {
        self.schedule.stop();
        self.schedule = Schedule::spawn(Arc::new(fetcher), interval, self.state.clone());
    }


    /// Cancels the schedule. No fetch starts afterwards and results of
    /// fetches still running are dropped. Idempotent.
    pub fn stop(&mut self) {
        self.schedule.stop();
    }

    /// Stops and waits for the scheduler task to exit.
    pub async fn shutdown(mut self) {
        self.schedule.stop();
        if let Some(task) = self.schedule.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Poller task ended abnormally.");
            }
        }
    }
}

impl<F: Fetcher> Drop for PollHandle<F> {
    fn drop(&mut self) {
        self.schedule.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::time::{sleep, timeout, Instant};

    /// Replays scripted responses, each after an optional delay. Repeats the
    /// last one when the script runs out.
    struct Scripted {
        calls: Arc<AtomicUsize>,
        script: Mutex<VecDeque<(u64, Result<u32, String>)>>,
        last: Mutex<(u64, Result<u32, String>)>,
    }

    impl Scripted {
        fn new(script: Vec<(u64, Result<u32, String>)>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let last = script.last().cloned().unwrap_or((0, Ok(0)));
            (
                Self {
                    calls: calls.clone(),
                    script: Mutex::new(script.into()),
                    last: Mutex::new(last),
                },
                calls,
            )
        }

        fn values(values: Vec<Result<u32, String>>) -> (Self, Arc<AtomicUsize>) {
            Self::new(values.into_iter().map(|v| (0, v)).collect())
        }
    }

    #[async_trait]
    impl Fetcher for Scripted {
        type Output = u32;
        type Error = String;

        async fn fetch(&self) -> Result<u32, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            let (delay_ms, result) = match next {
                Some(step) => step,
                None => self.last.lock().unwrap().clone(),
            };
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }
            result
        }
    }

    async fn wait_until<T, P>(rx: &mut watch::Receiver<PollState<T>>, predicate: P) -> PollState<T>
    where
        T: Clone,
        P: FnMut(&PollState<T>) -> bool,
    {
        timeout(Duration::from_secs(120), rx.wait_for(predicate))
            .await
            .expect("condition not reached in time")
            .expect("poller state channel closed")
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_value() {
        let (fetcher, _) = Scripted::values(vec![Ok(1), Err("boom".into()), Ok(3)]);
        let handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut rx = handle.subscribe();

        let state = wait_until(&mut rx, |s| s.data == Some(1)).await;
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());

        let state = wait_until(&mut rx, |s| s.error.is_some()).await;
        assert_eq!(state.data, Some(1));
        assert_eq!(state.error.unwrap().message, "boom");

        let state = wait_until(&mut rx, |s| s.data == Some(3)).await;
        assert!(state.error.is_none());
        assert_eq!(state.updates, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_stop() {
        let (fetcher, calls) = Scripted::values(vec![Ok(1)]);
        let mut handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data.is_some()).await;

        handle.stop();
        assert!(!handle.is_running());
        let before = calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_is_discarded_after_stop() {
        let (fetcher, _) = Scripted::new(vec![(1000, Ok(7))]);
        let mut handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.is_loading()).await;

        handle.stop();
        sleep(Duration::from_secs(5)).await;
        let state = handle.state();
        assert!(state.data.is_none());
        assert!(!state.is_loading());
        assert_eq!(state.updates, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let (fetcher, calls) = Scripted::values(vec![Ok(1)]);
        let handle = Poller::start(fetcher, Some(Duration::from_millis(500)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data.is_some()).await;

        drop(handle);
        let before = calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_fetches_immediately() {
        let (first, first_calls) = Scripted::values(vec![Ok(1)]);
        let mut handle = Poller::start(first, Some(Duration::from_secs(60)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data == Some(1)).await;

        let started = Instant::now();
        let (second, second_calls) = Scripted::values(vec![Ok(42)]);
        handle.reconfigure(second, Some(Duration::from_secs(60)));
        let state = wait_until(&mut rx, |s| s.data == Some(42)).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(state.error.is_none());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.interval(), Some(Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_runs_outside_the_schedule() {
        let (fetcher, calls) = Scripted::values(vec![Ok(1), Ok(2)]);
        let handle = Poller::start(fetcher, Some(Duration::from_secs(60)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data == Some(1)).await;

        let started = Instant::now();
        handle.refetch().await.unwrap();
        assert_eq!(handle.state().data, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_fetches_last_write_wins() {
        // The scheduled fetch is slow, the manual one is fast: the slow
        // result lands last and overwrites the fresher one.
        let (fetcher, _) = Scripted::new(vec![(5000, Ok(1)), (0, Ok(2))]);
        let handle = Poller::start(fetcher, Some(Duration::from_secs(60)));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.is_loading()).await;

        handle.refetch().await.unwrap();
        assert_eq!(handle.state().data, Some(2));

        let state = wait_until(&mut rx, |s| s.data == Some(1)).await;
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fetches_once() {
        let (fetcher, calls) = Scripted::values(vec![Ok(5)]);
        let handle = Poller::start(fetcher, None);
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data == Some(5)).await;

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_one_shot() {
        let (fetcher, calls) = Scripted::values(vec![Ok(1)]);
        let handle = Poller::start(fetcher, Some(Duration::ZERO));
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.data == Some(1)).await;

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        handle.shutdown().await;
    }
}
