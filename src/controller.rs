use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::highlight::{highlight, HighlightedWord};
use crate::metrics::{words_typed, LiveMetrics};
use crate::results::{aggregate, SessionStats};
use crate::session::{Session, SessionState};
use crate::word_timing::WordTimingLog;

/// Typed input to the session reducer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A target passage arrived. Ignored unless Idle.
    PassageLoaded(String),
    StartRequested,
    InputChanged(String),
    SubmitRequested,
    Tick(Instant),
    NewPassageRequested,
}

/// Something the host has to act on after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CountdownStarted,
    SessionStarted,
    SessionFinished(SessionStats),
    /// Proposed new best score, to hand to the user store
    BestWpmImproved { wpm: u32 },
}

/// Owns everything about the current attempt. Constructed once and reset in
/// place for every new passage.
#[derive(Debug)]
pub struct SessionController<R: Rng = StdRng> {
    session: Session,
    timing: WordTimingLog,
    metrics: LiveMetrics,
    stats: Option<SessionStats>,
    input: String,
    best_wpm: u32,
    rng: R,
}

impl SessionController<StdRng> {
    pub fn new(best_wpm: u32) -> Self {
        Self::with_rng(best_wpm, StdRng::from_entropy())
    }
}

impl<R: Rng> SessionController<R> {
    pub fn with_rng(best_wpm: u32, rng: R) -> Self {
        Self {
            session: Session::default(),
            timing: WordTimingLog::new(),
            metrics: LiveMetrics::default(),
            stats: None,
            input: String::new(),
            best_wpm,
            rng,
        }
    }

    /// Apply one event. `now` is the host clock reading for events that do not
    /// carry their own timestamp.
    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> Vec<Effect> {
        match event {
            SessionEvent::PassageLoaded(text) => {
                self.on_passage_loaded(text);
                vec![]
            }
            SessionEvent::StartRequested => self.on_start(now),
            SessionEvent::InputChanged(text) => {
                self.on_input(text, now);
                vec![]
            }
            SessionEvent::SubmitRequested => self.on_submit(now),
            SessionEvent::Tick(at) => self.on_tick(at),
            SessionEvent::NewPassageRequested => {
                self.reset();
                vec![]
            }
        }
    }

    fn on_passage_loaded(&mut self, text: String) {
        if self.session.state != SessionState::Idle {
            debug!(state = self.session.state.name(), "passage ignored outside idle");
            return;
        }
        self.session = Session::new(text);
        self.clear_attempt();
    }

    fn on_start(&mut self, now: Instant) -> Vec<Effect> {
        if self.session.state != SessionState::Idle || !self.session.has_text() {
            return vec![];
        }
        self.clear_attempt();
        self.session.begin_countdown(now);
        info!("countdown started");
        vec![Effect::CountdownStarted]
    }

    fn on_input(&mut self, text: String, now: Instant) {
        if !self.session.is_active() {
            return;
        }
        self.timing.observe(words_typed(&text), now);
        self.metrics = LiveMetrics::compute(
            &text,
            &self.session.target_text,
            self.session.elapsed_seconds,
        );
        self.input = text;
    }

    fn on_tick(&mut self, now: Instant) -> Vec<Effect> {
        match self.session.state {
            SessionState::CountingDown { .. } => {
                if self.session.advance_countdown(now) {
                    self.session.activate(now);
                    self.timing = WordTimingLog::new();
                    info!("session active");
                    return vec![Effect::SessionStarted];
                }
            }
            SessionState::Active => self.session.tick(now),
            SessionState::Idle | SessionState::Finished => {}
        }
        vec![]
    }

    fn on_submit(&mut self, now: Instant) -> Vec<Effect> {
        if !self.session.is_active() {
            return vec![];
        }
        self.session.finish(now);

        let stats = aggregate(
            &self.session.target_text,
            &self.input,
            self.session.elapsed_seconds,
            &self.timing.entries,
            &mut self.rng,
        );
        info!(
            wpm = stats.wpm,
            accuracy = stats.accuracy,
            time = stats.time_seconds,
            "session finished"
        );

        let mut effects = vec![Effect::SessionFinished(stats.clone())];
        if stats.wpm > self.best_wpm {
            info!(previous = self.best_wpm, wpm = stats.wpm, "new best wpm");
            self.best_wpm = stats.wpm;
            effects.push(Effect::BestWpmImproved { wpm: stats.wpm });
        }
        self.stats = Some(stats);

        effects
    }

    /// Tear down the attempt (countdown included) and go back to Idle with
    /// no passage.
    pub fn reset(&mut self) {
        self.session = Session::default();
        self.clear_attempt();
    }

    fn clear_attempt(&mut self) {
        self.timing = WordTimingLog::new();
        self.metrics = LiveMetrics::default();
        self.stats = None;
        self.input.clear();
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn target_text(&self) -> &str {
        &self.session.target_text
    }

    /// Digit to show while counting down
    pub fn countdown_remaining(&self) -> Option<u8> {
        match self.session.state {
            SessionState::CountingDown { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    pub fn accepts_input(&self) -> bool {
        self.session.is_active()
    }

    pub fn highlight(&self) -> Vec<HighlightedWord> {
        highlight(&self.input, &self.session.target_text)
    }

    pub fn metrics(&self) -> LiveMetrics {
        self.metrics
    }

    pub fn word_timing(&self) -> &WordTimingLog {
        &self.timing
    }

    pub fn stats(&self) -> Option<&SessionStats> {
        self.stats.as_ref()
    }

    pub fn best_wpm(&self) -> u32 {
        self.best_wpm
    }

    pub fn set_best_wpm(&mut self, best_wpm: u32) {
        self.best_wpm = best_wpm;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.session.elapsed_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use assert_matches::assert_matches;

    fn controller() -> SessionController {
        SessionController::with_rng(0, StdRng::seed_from_u64(1))
    }

    fn run_to_active(ctl: &mut SessionController, clock: &ManualClock, text: &str) {
        ctl.handle(SessionEvent::PassageLoaded(text.into()), clock.now());
        ctl.handle(SessionEvent::StartRequested, clock.now());
        clock.advance_ms(3300);
        let effects = ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        assert_eq!(effects, vec![Effect::SessionStarted]);
    }

    #[test]
    fn test_start_requires_text() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        assert!(ctl.handle(SessionEvent::StartRequested, clock.now()).is_empty());
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[test]
    fn test_input_ignored_during_countdown() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        ctl.handle(SessionEvent::PassageLoaded("a b".into()), clock.now());
        ctl.handle(SessionEvent::StartRequested, clock.now());

        ctl.handle(SessionEvent::InputChanged("a".into()), clock.now());
        assert_eq!(ctl.input(), "");
        assert!(!ctl.accepts_input());
        assert_eq!(ctl.countdown_remaining(), Some(3));
    }

    #[test]
    fn test_live_metrics_follow_input() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "a b c");

        clock.advance_ms(6000);
        ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        ctl.handle(SessionEvent::InputChanged("a x c".into()), clock.now());

        assert_eq!(ctl.metrics().accuracy_percent, 67);
        assert_eq!(ctl.metrics().words_per_minute, 30);
        let satisfied: Vec<bool> = ctl.highlight().iter().map(|w| w.satisfied).collect();
        assert_eq!(satisfied, vec![true, true, true]);
    }

    #[test]
    fn test_submit_finishes_once() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "hello world");

        clock.advance_ms(1000);
        ctl.handle(SessionEvent::InputChanged("hello world".into()), clock.now());
        let first = ctl.handle(SessionEvent::SubmitRequested, clock.now());
        assert_matches!(first.first(), Some(Effect::SessionFinished(_)));

        let second = ctl.handle(SessionEvent::SubmitRequested, clock.now());
        assert!(second.is_empty());
        assert_eq!(ctl.state(), SessionState::Finished);
    }

    #[test]
    fn test_best_wpm_only_proposed_when_beaten() {
        let clock = ManualClock::new();
        let mut ctl = SessionController::with_rng(1000, StdRng::seed_from_u64(1));
        run_to_active(&mut ctl, &clock, "a b");

        clock.advance_ms(2000);
        ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        ctl.handle(SessionEvent::InputChanged("a b".into()), clock.now());
        let effects = ctl.handle(SessionEvent::SubmitRequested, clock.now());

        assert_eq!(effects.len(), 1);
        assert_eq!(ctl.best_wpm(), 1000);
    }

    #[test]
    fn test_reset_mid_countdown_never_activates() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        ctl.handle(SessionEvent::PassageLoaded("a b".into()), clock.now());
        ctl.handle(SessionEvent::StartRequested, clock.now());

        clock.advance_ms(1500);
        ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        ctl.handle(SessionEvent::NewPassageRequested, clock.now());

        clock.advance_ms(5000);
        let effects = ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        assert!(effects.is_empty());
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(ctl.target_text(), "");
    }

    #[test]
    fn test_passage_ignored_while_active() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "first text");

        ctl.handle(SessionEvent::PassageLoaded("second".into()), clock.now());
        assert_eq!(ctl.target_text(), "first text");
    }

    #[test]
    fn test_late_tick_does_not_move_frozen_clock() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "a");

        clock.advance_ms(2000);
        ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        ctl.handle(SessionEvent::SubmitRequested, clock.now());

        clock.advance_ms(2000);
        ctl.handle(SessionEvent::Tick(clock.now()), clock.now());
        assert_eq!(ctl.elapsed_seconds(), 2.0);
    }

    #[test]
    fn test_first_word_only_sets_the_timing_anchor() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "a b c");

        clock.advance_ms(2000);
        ctl.handle(SessionEvent::InputChanged("a".into()), clock.now());
        clock.advance_ms(500);
        ctl.handle(SessionEvent::InputChanged("a b".into()), clock.now());
        clock.advance_ms(500);
        ctl.handle(SessionEvent::InputChanged("a b c".into()), clock.now());

        assert_eq!(ctl.word_timing().entries, vec![0.5, 0.5]);

        ctl.handle(SessionEvent::SubmitRequested, clock.now());
        let stats = ctl.stats().unwrap();
        assert_eq!(stats.word_times, vec![0.5, 0.5]);
        assert_eq!(stats.slowest_word, "a");
    }

    #[test]
    fn test_submit_takes_final_clock_reading() {
        let clock = ManualClock::new();
        let mut ctl = controller();
        run_to_active(&mut ctl, &clock, "a b");

        clock.advance_ms(500);
        ctl.handle(SessionEvent::InputChanged("a b".into()), clock.now());
        clock.advance_ms(2500);
        ctl.handle(SessionEvent::SubmitRequested, clock.now());

        assert_eq!(ctl.elapsed_seconds(), 3.0);
        assert_eq!(ctl.stats().map(|s| s.time_seconds), Some(3));
    }
}
