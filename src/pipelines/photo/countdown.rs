// SPDX-License-Identifier: GPL-3.0-only

//! Photo timer state machine
//!
//! `Idle -> Counting(n) -> ... -> Counting(1) -> Idle`, one transition per
//! tick. The controller never sleeps: it tells its owner when the next tick
//! is due and the owner delivers it back. Every scheduled tick carries the
//! generation it was issued for; cancelling bumps the generation so ticks
//! already in flight are recognised as stale and dropped.

use crate::constants::COUNTDOWN_TICK;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Idle,
    /// Seconds left before the capture fires
    Counting(u32),
}

/// What to do after a capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStart {
    /// Timer is 0: capture right away
    FireNow,
    /// Countdown started; deliver a tick for `generation` after `after`
    Scheduled {
        remaining: u32,
        generation: u64,
        after: Duration,
    },
    /// A countdown is already running
    Ignored,
}

/// What to do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a cancelled countdown
    Stale,
    /// Keep counting; deliver the next tick after `after`
    Continue {
        remaining: u32,
        generation: u64,
        after: Duration,
    },
    /// Countdown reached zero: capture now
    Fire,
}

#[derive(Debug, Default)]
pub struct CountdownController {
    state: CountdownState,
    generation: u64,
}

impl CountdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CountdownState::Idle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle a capture request with the configured timer
    pub fn request(&mut self, timer_seconds: u32) -> CountdownStart {
        if let CountdownState::Counting(remaining) = self.state {
            debug!(remaining, "Capture requested during countdown, ignoring");
            return CountdownStart::Ignored;
        }
        if timer_seconds == 0 {
            return CountdownStart::FireNow;
        }

        self.generation += 1;
        self.state = CountdownState::Counting(timer_seconds);
        debug!(seconds = timer_seconds, generation = self.generation, "Countdown started");

        CountdownStart::Scheduled {
            remaining: timer_seconds,
            generation: self.generation,
            after: COUNTDOWN_TICK,
        }
    }

    /// Advance by one tick
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        let CountdownState::Counting(remaining) = self.state else {
            return TickOutcome::Stale;
        };
        if generation != self.generation {
            debug!(generation, current = self.generation, "Dropping stale countdown tick");
            return TickOutcome::Stale;
        }

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.state = CountdownState::Idle;
            return TickOutcome::Fire;
        }

        self.state = CountdownState::Counting(remaining);
        TickOutcome::Continue {
            remaining,
            generation,
            after: COUNTDOWN_TICK,
        }
    }

    /// Abort any running countdown; outstanding ticks become stale
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!(generation = self.generation, "Countdown cancelled");
        }
        self.generation += 1;
        self.state = CountdownState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timer_fires_without_counting() {
        let mut countdown = CountdownController::new();
        assert_eq!(countdown.request(0), CountdownStart::FireNow);
        assert!(countdown.is_idle());
    }

    #[test]
    fn three_second_timer_fires_on_third_tick() {
        let mut countdown = CountdownController::new();
        let CountdownStart::Scheduled { generation, remaining, .. } = countdown.request(3) else {
            panic!("countdown should start");
        };
        assert_eq!(remaining, 3);

        assert!(matches!(countdown.tick(generation), TickOutcome::Continue { remaining: 2, .. }));
        assert!(matches!(countdown.tick(generation), TickOutcome::Continue { remaining: 1, .. }));
        assert_eq!(countdown.tick(generation), TickOutcome::Fire);
        assert!(countdown.is_idle());
        assert_eq!(countdown.tick(generation), TickOutcome::Stale);
    }

    #[test]
    fn requests_during_countdown_are_ignored() {
        let mut countdown = CountdownController::new();
        countdown.request(5);
        assert_eq!(countdown.request(5), CountdownStart::Ignored);
        assert_eq!(countdown.state(), CountdownState::Counting(5));
    }

    #[test]
    fn cancelled_ticks_are_stale() {
        let mut countdown = CountdownController::new();
        let CountdownStart::Scheduled { generation, .. } = countdown.request(2) else {
            panic!("countdown should start");
        };
        countdown.cancel();
        assert_eq!(countdown.tick(generation), TickOutcome::Stale);

        // A fresh countdown ignores ticks of the cancelled one
        countdown.request(2);
        assert_eq!(countdown.tick(generation), TickOutcome::Stale);
        assert_eq!(countdown.state(), CountdownState::Counting(2));
    }
}
