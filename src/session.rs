use std::time::{Duration, Instant};

use crate::clock::seconds_between;

/// Countdown starts at this digit
pub const COUNTDOWN_FROM: u8 = 3;
/// Time each countdown digit stays on screen
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(1000);
/// Pause after the last digit before input opens
pub const COUNTDOWN_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No text loaded, or loaded and waiting for start
    Idle,
    /// 3-2-1 before input opens. `remaining` hits 0 during the fade.
    CountingDown { remaining: u8, next_step_at: Instant },
    Active,
    Finished,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::CountingDown { .. } => "counting_down",
            SessionState::Active => "active",
            SessionState::Finished => "finished",
        }
    }
}

/// One attempt at typing a given passage
#[derive(Debug, Clone)]
pub struct Session {
    pub target_text: String,
    pub state: SessionState,
    pub start_time: Option<Instant>,
    /// Only advanced by the clock tick while Active
    pub elapsed_seconds: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            target_text: String::new(),
            state: SessionState::Idle,
            start_time: None,
            elapsed_seconds: 0.0,
        }
    }
}

impl Session {
    pub fn new(target_text: String) -> Self {
        Self {
            target_text,
            ..Self::default()
        }
    }

    pub fn has_text(&self) -> bool {
        !self.target_text.trim().is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn begin_countdown(&mut self, now: Instant) {
        self.state = SessionState::CountingDown {
            remaining: COUNTDOWN_FROM,
            next_step_at: now + COUNTDOWN_STEP,
        };
        self.start_time = None;
        self.elapsed_seconds = 0.0;
    }

    /// Advance the countdown. Returns true when it has run out and the
    /// session should go active.
    pub fn advance_countdown(&mut self, now: Instant) -> bool {
        let SessionState::CountingDown {
            mut remaining,
            mut next_step_at,
        } = self.state
        else {
            return false;
        };

        while now >= next_step_at {
            if remaining == 0 {
                return true;
            }
            remaining -= 1;
            next_step_at += if remaining == 0 {
                COUNTDOWN_FADE
            } else {
                COUNTDOWN_STEP
            };
        }

        self.state = SessionState::CountingDown {
            remaining,
            next_step_at,
        };
        false
    }

    pub fn activate(&mut self, now: Instant) {
        self.state = SessionState::Active;
        self.start_time = Some(now);
        self.elapsed_seconds = 0.0;
    }

    /// Clock tick. No-op unless Active, so a late tick cannot overwrite the
    /// frozen elapsed time.
    pub fn tick(&mut self, now: Instant) {
        if !self.is_active() {
            return;
        }
        if let Some(start) = self.start_time {
            let elapsed = seconds_between(start, now);
            if elapsed > self.elapsed_seconds {
                self.elapsed_seconds = elapsed;
            }
        }
    }

    /// Take a last clock reading and freeze the elapsed time
    pub fn finish(&mut self, now: Instant) {
        self.tick(now);
        self.state = SessionState::Finished;
    }
}
