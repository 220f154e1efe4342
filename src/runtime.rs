//! Terminal event plumbing for the front-end loop.
//!
//! A reader thread turns crossterm events into [`DrillEvent`]s on a channel;
//! [`Runner::step`] waits on that channel for at most one tick interval, so
//! the caller gets a steady heartbeat for bringing the game clock forward.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Resize,
    /// No input arrived within the tick interval
    Tick,
    /// The source hung up; no further input will arrive
    Closed,
}

/// Maps a raw terminal event to one the drill cares about.
///
/// Only key presses pass: Windows also reports releases and repeats, and a
/// released Enter must not submit twice.
pub fn translate(event: CtEvent) -> Option<DrillEvent> {
    match event {
        CtEvent::Key(key) if key.kind == KeyEventKind::Press => Some(DrillEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(DrillEvent::Resize),
        _ => None,
    }
}

pub trait DrillEventSource: Send + 'static {
    /// Waits up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError>;
}

pub struct CrosstermEventSource {
    rx: Receiver<DrillEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    log::error!("terminal event read failed: {}", err);
                    break;
                }
            };
            if let Some(event) = translate(event) {
                if tx.send(event).is_err() {
                    break;
                }
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

impl DrillEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scripted events for headless runs.
pub struct TestEventSource {
    rx: Receiver<DrillEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DrillEvent>) -> Self {
        Self { rx }
    }
}

impl DrillEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

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
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

pub struct Runner<E: DrillEventSource, T: Ticker> {
    events: E,
    ticker: T,
}

impl<E: DrillEventSource, T: Ticker> Runner<E, T> {
    pub fn new(events: E, ticker: T) -> Self {
        Self { events, ticker }
    }

    /// Next event, or [`DrillEvent::Tick`] once the interval passes quietly.
    /// A source that hung up yields [`DrillEvent::Closed`] without waiting.
    pub fn step(&self) -> DrillEvent {
        match self.events.recv_timeout(self.ticker.interval()) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => DrillEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => DrillEvent::Closed,
        }
    }
}
