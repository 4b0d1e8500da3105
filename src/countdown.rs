use std::fmt;
use std::fmt::Formatter;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::config::Settings;
use crate::runtime::Event;
use crate::ui::ProgressBar;
use crate::util::format_remaining;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const FLASH_INTERVAL: Duration = Duration::from_millis(200);
/// 3 full on/off cycles
pub const TOTAL_FLASHES: u32 = 6;
pub const MAX_BAR_WIDTH: u16 = 80;
/// Bar width used until the terminal reports its size
pub const DEFAULT_BAR_WIDTH: u16 = 40;
/// Columns reserved around the bar for the remaining-time field
const CHROME_WIDTH: u16 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownError {
    EmptyCountdown,
}

impl fmt::Display for CountdownError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CountdownError::EmptyCountdown => write!(f, "nothing to count down to"),
        }
    }
}

impl std::error::Error for CountdownError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Flashing,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashState {
    pub flash_count: u32,
    pub bar_visible: bool,
}

/// What the event loop has to do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ScheduleTick(Duration),
    ScheduleFlash(Duration),
    Quit,
}

/// The countdown being displayed: a progress bar that fills until `target`
/// has elapsed since `start`, then flashes and quits.
#[derive(Debug, Clone)]
pub struct Countdown {
    start: Instant,
    target: Duration,
    fraction: f64,
    bar_width: u16,
    max_width: u16,
    prefix: String,
    phase: Phase,
    flash: Option<FlashState>,
}

pub fn is_cancel_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Esc => true,
        _ => false,
    }
}

impl Countdown {
    pub fn new(
        settings: &Settings,
        start: Instant,
        target: Duration,
    ) -> Result<Self, CountdownError> {
        if target.is_zero() {
            return Err(CountdownError::EmptyCountdown);
        }

        info!("counting down {:?} with prefix {:?}", target, settings.prefix);
        Ok(Self {
            start,
            target,
            fraction: 0.0,
            bar_width: DEFAULT_BAR_WIDTH.min(settings.max_width),
            max_width: settings.max_width,
            prefix: settings.prefix.clone(),
            phase: Phase::Running,
            flash: None,
        })
    }

    /// The effect that kicks the loop off.
    pub fn init(&self) -> Effect {
        Effect::ScheduleTick(TICK_INTERVAL)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn flash(&self) -> Option<FlashState> {
        self.flash
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    pub fn bar_width(&self) -> u16 {
        self.bar_width
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Whether the bar is drawn; false only during the "off" half of a flash.
    pub fn bar_visible(&self) -> bool {
        self.flash.map_or(true, |f| f.bar_visible)
    }

    /// Completion at `now`, clamped to [0, 1].
    pub fn fraction_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.start);
        if elapsed >= self.target {
            return 1.0;
        }
        elapsed.as_secs_f64() / self.target.as_secs_f64()
    }

    /// Time left at `now`, zero once the target has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        if self.is_flashing() {
            return Duration::ZERO;
        }
        let elapsed = now.saturating_duration_since(self.start);
        self.target.saturating_sub(elapsed)
    }

    pub fn update(&mut self, event: Event, now: Instant) -> Effect {
        if self.phase == Phase::Terminated {
            return Effect::None;
        }

        match event {
            Event::Key(key) => {
                if is_cancel_key(&key) {
                    debug!("cancelled in {:?}", self.phase);
                    self.phase = Phase::Terminated;
                    return Effect::Quit;
                }
                Effect::None
            }
            Event::Resize(width) => {
                self.on_resize(width);
                Effect::None
            }
            Event::Tick => self.on_tick(now),
            Event::Flash => self.on_flash(),
        }
    }

    fn on_resize(&mut self, width: u16) {
        let prefix_width = u16::try_from(self.prefix.width()).unwrap_or(u16::MAX);
        self.bar_width = width
            .saturating_sub(prefix_width.saturating_mul(2))
            .saturating_sub(CHROME_WIDTH)
            .min(self.max_width);
        debug!("resized to {} columns, bar width {}", width, self.bar_width);
    }

    fn on_tick(&mut self, now: Instant) -> Effect {
        if self.phase != Phase::Running {
            return Effect::None;
        }

        self.fraction = self.fraction_at(now);
        if self.fraction >= 1.0 {
            self.fraction = 1.0;
            self.phase = Phase::Flashing;
            self.flash = Some(FlashState {
                flash_count: 0,
                bar_visible: true,
            });
            debug!("target reached, flashing");
            return Effect::ScheduleFlash(FLASH_INTERVAL);
        }

        Effect::ScheduleTick(TICK_INTERVAL)
    }

    fn on_flash(&mut self) -> Effect {
        let Some(flash) = self.flash.as_mut() else {
            return Effect::None;
        };

        flash.flash_count += 1;
        flash.bar_visible = !flash.bar_visible;
        debug!("flash {} of {}", flash.flash_count, TOTAL_FLASHES);

        if flash.flash_count >= TOTAL_FLASHES {
            self.phase = Phase::Terminated;
            return Effect::Quit;
        }
        Effect::ScheduleFlash(FLASH_INTERVAL)
    }

    pub fn progress_bar(&self) -> ProgressBar {
        ProgressBar::new(self.fraction, self.bar_width)
    }

    /// One frame of output: prefix, bar (or blanks while flashed off) and time left.
    pub fn render(&self, now: Instant) -> String {
        let bar = self.progress_bar();
        let bar_text = if self.bar_visible() {
            bar.text()
        } else {
            bar.blank()
        };
        format!(
            "{}{} {}\n",
            self.prefix,
            bar_text,
            format_remaining(self.remaining(now))
        )
    }
}
