use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::clock::Clock;

/// Raw input from the terminal, before it is stamped with the session clock
#[derive(Clone, Debug)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize,
}

/// What the app loop acts on. Keys and ticks carry the clock reading taken
/// when the runner handed them out.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key { key: KeyEvent, at: Instant },
    Resize,
    Tick(Instant),
}

/// Where terminal input comes from
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next terminal event
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<TerminalEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // release events would count each keystroke twice
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(TerminalEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(TerminalEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How often the countdown and live metrics are refreshed without input
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Interval from the config's tick rate, never zero
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Event source fed from a channel, for headless runs
pub struct TestEventSource {
    rx: Receiver<TerminalEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TerminalEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls terminal events and stamps them with the session clock. The app never
/// reads a clock itself, so every timestamp the session sees comes from here.
pub struct Runner<E: EventSource, T: Ticker, C: Clock> {
    event_source: E,
    ticker: T,
    clock: C,
}

impl<E: EventSource, T: Ticker, C: Clock> Runner<E, T, C> {
    pub fn new(event_source: E, ticker: T, clock: C) -> Self {
        Self {
            event_source,
            ticker,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Wait up to one tick interval for input. A quiet interval, or a source
    /// that has gone away, yields a tick.
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(TerminalEvent::Key(key)) => AppEvent::Key {
                key,
                at: self.clock.now(),
            },
            Ok(TerminalEvent::Resize) => AppEvent::Resize,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AppEvent::Tick(self.clock.now())
            }
        }
    }
}
