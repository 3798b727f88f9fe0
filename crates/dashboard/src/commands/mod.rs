//! Command handlers behind the CLI subcommands.

pub mod compare;
pub mod home;
pub mod metrics;
pub mod runs;
pub mod settings;
pub mod submit;
pub mod workflows;

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, VibeClient};
use crate::config::{ConfigError, DashboardConfig};
use crate::polling::{Fetcher, PollHandle, PollState};
use crate::submission::SubmitError;
use farmvibes_common::ValidationError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    NotAllowed(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What every command needs: the resolved configuration and a client for it.
pub struct Context {
    pub config: DashboardConfig,
    pub client: VibeClient,
}

impl Context {
    pub fn new(config: DashboardConfig, client: VibeClient) -> Self {
        Self { config, client }
    }
}

/// Waits for the first fetch of a poller to settle and returns its data.
pub(crate) async fn first_result<F: Fetcher>(
    handle: &PollHandle<F>,
) -> Result<F::Output, CommandError> {
    let mut rx = handle.subscribe();
    let state = rx
        .wait_for(|s| s.data.is_some() || s.error.is_some())
        .await
        .map_err(|_| CommandError::Fetch("poller stopped before producing a result".to_string()))?
        .clone();
    match (state.data, state.error) {
        (Some(data), _) => Ok(data),
        (None, Some(err)) => Err(CommandError::Fetch(err.message)),
        (None, None) => Err(CommandError::Fetch("no data".to_string())),
    }
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Remembers which poller update was drawn last. Changes to the in-flight
/// count alone never trigger a redraw.
#[derive(Debug, Default)]
pub(crate) struct RedrawGate {
    drawn: Option<u64>,
}

impl RedrawGate {
    /// True for the first state seen (the loading frame) and for every
    /// state carrying a result or error that has not been drawn yet.
    pub(crate) fn should_redraw<T>(&mut self, state: &PollState<T>) -> bool {
        if self.drawn == Some(state.updates) {
            return false;
        }
        self.drawn = Some(state.updates);
        true
    }
}

fn draw_frame<W: Write>(out: &mut W, frame: &str, interval: Option<Duration>) -> io::Result<()> {
    write!(out, "{CLEAR_SCREEN}")?;
    writeln!(out, "{frame}")?;
    writeln!(
        out,
        "\n(refreshing every {}s, Ctrl-C to exit)",
        interval.map_or(0, |i| i.as_secs())
    )?;
    out.flush()
}

/// Redraws `render(state)` on stdout whenever the poller lands a result or
/// an error, until Ctrl-C or until `finished` says the data will not change
/// any more.
pub(crate) async fn watch<F, R, D>(handle: PollHandle<F>, render: R, finished: D) -> Result<(), CommandError>
where
    F: Fetcher,
    R: Fn(&PollState<F::Output>) -> String,
    D: Fn(&F::Output) -> bool,
{
    let interrupted = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupted, stopping watch."),
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, stopping watch."),
        }
    };
    watch_until(handle, render, finished, &mut io::stdout(), interrupted).await
}

/// [`watch`] with the output and the stop signal supplied by the caller.
pub(crate) async fn watch_until<F, R, D, W, S>(
    mut handle: PollHandle<F>,
    render: R,
    finished: D,
    out: &mut W,
    stop: S,
) -> Result<(), CommandError>
where
    F: Fetcher,
    R: Fn(&PollState<F::Output>) -> String,
    D: Fn(&F::Output) -> bool,
    W: Write,
    S: Future<Output = ()>,
{
    let mut rx = handle.subscribe();
    let mut gate = RedrawGate::default();
    tokio::pin!(stop);

    let mut state = rx.borrow_and_update().clone();
    loop {
        if gate.should_redraw(&state) {
            draw_frame(out, &render(&state), handle.interval())?;
            if state.data.as_ref().is_some_and(&finished) {
                break;
            }
        }
        tokio::select! {
            _ = &mut stop => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                state = rx.borrow_and_update().clone();
            }
        }
    }
    handle.stop();
    Ok(())
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` declines.
pub(crate) fn confirm(prompt: &str) -> Result<bool, CommandError> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polling::{PollError, Poller};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, timeout};

    /// Counts calls and answers with the call number after `delay`, unless a
    /// scripted answer is queued.
    struct Counter {
        delay: Duration,
        calls: Arc<AtomicU32>,
        script: Mutex<VecDeque<Result<u32, String>>>,
    }

    impl Counter {
        fn new(delay_ms: u64, script: Vec<Result<u32, String>>) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            let fetcher = Self {
                delay: Duration::from_millis(delay_ms),
                calls: calls.clone(),
                script: Mutex::new(script.into()),
            };
            (fetcher, calls)
        }
    }

    #[async_trait]
    impl Fetcher for Counter {
        type Output = u32;
        type Error = String;

        async fn fetch(&self) -> Result<u32, String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let scripted = self.script.lock().unwrap().pop_front();
            sleep(self.delay).await;
            scripted.unwrap_or(Ok(n))
        }
    }

    fn describe(state: &PollState<u32>) -> String {
        format!(
            "data={:?} error={:?}",
            state.data,
            state.error.as_ref().map(|e| e.message.as_str())
        )
    }

    fn frames(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out)
            .split(CLEAR_SCREEN)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_gate_ignores_in_flight_changes() {
        let mut gate = RedrawGate::default();
        let mut state: PollState<u32> = PollState::default();
        assert!(gate.should_redraw(&state));

        state.in_flight = 1;
        assert!(!gate.should_redraw(&state));

        state.data = Some(1);
        state.updates = 1;
        state.in_flight = 1;
        assert!(gate.should_redraw(&state));
        assert!(!gate.should_redraw(&state));

        state.error = Some(PollError {
            message: "down".into(),
            at: Utc::now(),
        });
        state.updates = 2;
        state.in_flight = 2;
        assert!(gate.should_redraw(&state));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_keeps_drawing_when_fetches_outlast_the_interval() {
        let (fetcher, _) = Counter::new(3000, Vec::new());
        let handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut out = Vec::new();

        watch_until(handle, describe, |_| false, &mut out, sleep(Duration::from_secs(60)))
            .await
            .unwrap();

        let frames = frames(&out);
        assert!(frames[0].starts_with("data=None error=None"));
        assert!(frames.len() >= 20, "only {} frames drawn", frames.len());
        assert!(frames.last().unwrap().contains("data=Some("));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_stops_once_finished_and_tears_down_the_poller() {
        let (fetcher, calls) = Counter::new(0, Vec::new());
        let handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut out = Vec::new();

        timeout(
            Duration::from_secs(120),
            watch_until(handle, describe, |n: &u32| *n >= 3, &mut out, std::future::pending()),
        )
        .await
        .expect("watch did not finish")
        .unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(frames(&out).last().unwrap().starts_with("data=Some(3)"));
        assert!(!text.contains("data=Some(4)"));

        let seen = calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_redraws_errors_over_last_good_data() {
        let (fetcher, _) = Counter::new(0, vec![Ok(10), Err("service down".into())]);
        let handle = Poller::start(fetcher, Some(Duration::from_millis(2000)));
        let mut out = Vec::new();

        watch_until(handle, describe, |_| false, &mut out, sleep(Duration::from_millis(5000)))
            .await
            .unwrap();

        let frames = frames(&out);
        assert!(frames.iter().any(|f| f.starts_with("data=Some(10) error=None")));
        assert!(frames
            .iter()
            .any(|f| f.starts_with("data=Some(10) error=Some(\"service down\")")));
        assert!(frames.last().unwrap().starts_with("data=Some(3) error=None"));
    }
}
