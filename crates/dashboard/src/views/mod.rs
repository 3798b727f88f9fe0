//! Plain-text renderers. Every view returns a `String`; printing is left to
//! the command layer.

pub mod compare;
pub mod home;
pub mod metrics;
pub mod outputs;
pub mod runs;
pub mod settings;
pub mod workflows;

use crate::polling::PollState;

/// Renders polled data. Before the first success the loading text (or the
/// failure text once a fetch has failed) stands in; after it the last good
/// data is shown, with a failure note when the latest fetch failed.
pub fn render_polled<T, R>(state: &PollState<T>, loading: &str, failure: &str, render: R) -> String
where
    R: FnOnce(&T) -> String,
{
    match (&state.data, &state.error) {
        (Some(data), None) => render(data),
        (Some(data), Some(_)) => {
            let updated = state
                .last_updated
                .map(|at| at.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{}\n! {failure} (showing data from {updated})", render(data))
        }
        (None, Some(_)) => failure.to_string(),
        (None, None) => loading.to_string(),
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_render_polled_states() {
        let mut state: PollState<u32> = PollState::default();
        let render = |v: &u32| format!("value {v}");
        assert_eq!(render_polled(&state, "loading", "failed", render), "loading");

        state.error = Some(crate::polling::PollError {
            message: "timeout".into(),
            at: Utc::now(),
        });
        assert_eq!(render_polled(&state, "loading", "failed", render), "failed");

        state.data = Some(3);
        let text = render_polled(&state, "loading", "failed", render);
        assert!(text.starts_with("value 3\n! failed"));

        state.error = None;
        assert_eq!(render_polled(&state, "loading", "failed", render), "value 3");
    }

    #[test]
    fn test_truncate_and_short_id() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(short_id("7b1c2d3e-aaaa"), "7b1c2d3e");
        assert_eq!(short_id("abc"), "abc");
    }
}
