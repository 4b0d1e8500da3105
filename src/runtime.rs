use std::ops::ControlFlow;
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::debug;

use crate::clock::Clock;
use crate::countdown::Effect;

/// Unified event type consumed by the countdown
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    /// New terminal width in columns
    Resize(u16),
    Tick,
    Flash,
}

/// Source of terminal events (keyboard, resize)
pub trait EventSource: Send + 'static {
    /// Block until an event arrives.
    fn recv(&self) -> Result<Event, RecvError>;

    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<Event>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                Ok(CtEvent::Resize(cols, _)) => Event::Resize(cols),
                Ok(_) => continue,
                Err(err) => {
                    debug!("input reader stopped: {}", err);
                    break;
                }
            };

            if tx.send(ev).is_err() {
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
    fn recv(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<Event>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<Event>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    deadline: Instant,
    event: Event,
}

/// Runner that delivers one event at a time: input from the source, or the
/// single armed timer once its deadline passes on the given clock.
pub struct Runner<E: EventSource> {
    event_source: E,
    timer: Option<Timer>,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E) -> Self {
        Self {
            event_source,
            timer: None,
        }
    }

    /// Arm the timer slot `after` past `now`, replacing whatever was pending.
    pub fn schedule(&mut self, event: Event, after: Duration, now: Instant) {
        debug!("scheduling {:?} in {:?}", event, after);
        self.timer = Some(Timer {
            deadline: now + after,
            event,
        });
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Carry out an effect returned by the countdown.
    pub fn apply(&mut self, effect: Effect, now: Instant) -> ControlFlow<()> {
        match effect {
            Effect::None => {}
            Effect::ScheduleTick(after) => self.schedule(Event::Tick, after, now),
            Effect::ScheduleFlash(after) => self.schedule(Event::Flash, after, now),
            Effect::Quit => {
                self.timer = None;
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Blocks until the next input event or the armed timer fires on `clock`.
    /// Returns None once input is closed and nothing is scheduled.
    pub fn step<C: Clock>(&mut self, clock: &C) -> Option<Event> {
        let Some(timer) = self.timer else {
            return self.event_source.recv().ok();
        };

        let wait = timer.deadline.saturating_duration_since(clock.now());
        match self.event_source.recv_timeout(clock.real_wait(wait)) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => Some(self.fire(timer, clock)),
            Err(RecvTimeoutError::Disconnected) => {
                let wait = timer.deadline.saturating_duration_since(clock.now());
                std::thread::sleep(clock.real_wait(wait));
                Some(self.fire(timer, clock))
            }
        }
    }

    fn fire<C: Clock>(&mut self, timer: Timer, clock: &C) -> Event {
        clock.reach(timer.deadline);
        self.timer = None;
        timer.event
    }
}
