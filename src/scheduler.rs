//! Render loop scheduling.
//!
//! The loop is a chain of single refresh callbacks: every finished frame asks
//! the host for exactly one more. [`FrameScheduler`] owns that decision, so the
//! tick itself never reschedules and cancellation is a single flag check.
//!
//! ```text
//! Idle --start--> Scheduled --begin--> Rendering --finish--> Scheduled ...
//!                     \                    \
//!                      cancel               cancel (current draw completes,
//!                       \                    \      no further request)
//!                        +------> Cancelled <-+
//! ```

use crate::mount::{CancelToken, FrameHost};

/// Where the loop is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not started.
    Idle,
    /// A refresh callback has been requested.
    Scheduled,
    /// Inside a tick.
    Rendering,
    /// Stopped for good.
    Cancelled,
}

/// Drives the once-per-refresh callback chain.
#[derive(Debug)]
pub struct FrameScheduler {
    state: LoopState,
    token: CancelToken,
}

impl FrameScheduler {
    pub fn new(token: CancelToken) -> Self {
        Self {
            state: LoopState::Idle,
            token,
        }
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.sync()
    }

    /// Token shared with whoever may stop this loop from outside.
    #[inline]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Request the first frame. Only valid from `Idle`.
    pub fn start(&mut self, host: &impl FrameHost) -> bool {
        if self.token.is_cancelled() || self.state != LoopState::Idle {
            return false;
        }
        self.request(host);
        true
    }

    /// Enter a tick. False means the loop is cancelled or not started and the
    /// caller must not run engine logic.
    pub fn begin(&mut self) -> bool {
        match self.state() {
            LoopState::Scheduled | LoopState::Rendering => {
                self.state = LoopState::Rendering;
                true
            }
            LoopState::Idle | LoopState::Cancelled => false,
        }
    }

    /// Leave a tick, requesting the next one unless cancelled meanwhile.
    pub fn finish(&mut self, host: &impl FrameHost) {
        if self.state() == LoopState::Rendering {
            self.request(host);
        }
    }

    /// Stop the loop. Any frame callback already queued by the host becomes a no-op.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.state = LoopState::Cancelled;
    }

    fn request(&mut self, host: &impl FrameHost) {
        self.state = LoopState::Scheduled;
        host.request_frame();
    }

    fn sync(&self) -> LoopState {
        if self.token.is_cancelled() {
            LoopState::Cancelled
        } else {
            self.state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingHost(Cell<u32>);

    impl FrameHost for CountingHost {
        fn request_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_cycle() {
        let host = CountingHost::default();
        let mut s = FrameScheduler::new(CancelToken::new());
        assert_eq!(s.state(), LoopState::Idle);
        assert!(!s.begin());

        assert!(s.start(&host));
        assert!(!s.start(&host));
        assert_eq!(s.state(), LoopState::Scheduled);

        for _ in 0..5 {
            assert!(s.begin());
            assert_eq!(s.state(), LoopState::Rendering);
            s.finish(&host);
            assert_eq!(s.state(), LoopState::Scheduled);
        }
        assert_eq!(host.0.get(), 6);
    }

    #[test]
    fn test_cancel_mid_tick_does_not_reschedule() {
        let host = CountingHost::default();
        let mut s = FrameScheduler::new(CancelToken::new());
        s.start(&host);
        assert!(s.begin());
        s.cancel();
        s.finish(&host);

        assert_eq!(host.0.get(), 1);
        assert_eq!(s.state(), LoopState::Cancelled);
        assert!(!s.begin());
    }

    #[test]
    fn test_external_token_cancels() {
        let host = CountingHost::default();
        let token = CancelToken::new();
        let mut s = FrameScheduler::new(token.clone());
        s.start(&host);

        token.cancel();
        assert_eq!(s.state(), LoopState::Cancelled);
        assert!(!s.begin());
        s.finish(&host);
        assert_eq!(host.0.get(), 1);
    }
}
