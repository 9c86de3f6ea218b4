use std::time::Duration;
use std::time::Instant;

/// Cool-down between accepted submissions. Key repeat and paired
/// keydown/keypress events can fire Enter twice in quick succession; the
/// second press must not produce a second dispatch.
pub(crate) const SUBMIT_COOLDOWN: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy)]
enum GuardState {
    Ready,
    Submitting { until: Instant },
}

/// Small state machine guarding submission re-entrancy.
#[derive(Debug)]
pub(crate) struct SubmitGuard {
    state: GuardState,
}

impl SubmitGuard {
    pub(crate) fn new() -> Self {
        Self {
            state: GuardState::Ready,
        }
    }

    /// Try to start a submission at `now`. Returns false while a previous
    /// submission's cool-down is still running.
    pub(crate) fn try_begin(&mut self, now: Instant) -> bool {
        if let GuardState::Submitting { until } = self.state
            && now < until
        {
            return false;
        }
        self.state = GuardState::Submitting {
            until: now + SUBMIT_COOLDOWN,
        };
        true
    }
}
