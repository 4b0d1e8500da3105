use std::ffi::OsString;
use std::io::{self, stdin};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use clap::{error::ErrorKind, CommandFactory, FromArgMatches, Parser};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use env_logger::Env;
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal, TerminalOptions, Viewport,
};

use crate::{
    clock::{Clock, SystemClock},
    config::{ConfigStore, FileConfigStore, Settings},
    countdown::Countdown,
    deadline::{self, DeadlineError},
    error::AppError,
    runtime::{CrosstermEventSource, Event, EventSource, Runner},
    ui::CountdownView,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LOG_ENV: &str = "BACKAT_LOG";

/// Which kind of deadline the positional argument holds
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display, strum_macros::IntoStaticStr)]
pub enum Mode {
    /// a wall clock time, "back at 14:30"
    #[strum(serialize = "back-at")]
    At,
    /// a duration from now, "back in 15m"
    #[strum(serialize = "back-in")]
    In,
}

impl Mode {
    pub fn from_program_name(name: &str) -> Option<Mode> {
        match name {
            "back-at" => Some(Mode::At),
            "back-in" => Some(Mode::In),
            _ => None,
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Mode::At => "back-at [OPTIONS] HH:MM (or HH:MMpm)",
            Mode::In => "back-in [OPTIONS] DURATION (e.g. 15m)",
        }
    }

    pub fn resolve<Tz: TimeZone>(
        &self,
        input: &str,
        now: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, DeadlineError> {
        match self {
            Mode::At => deadline::parse_time_of_day(input, now),
            Mode::In => deadline::parse_relative(input, now),
        }
    }
}

/// show a progress bar that fills up until you're back
#[derive(Parser, Debug, Clone)]
#[clap(disable_version_flag = true)]
pub struct Cli {
    /// when you'll be back
    #[clap(value_name = "WHEN")]
    when: Vec<String>,

    /// progress bar prefix [default: "☕ "]
    #[clap(long)]
    prefix: Option<String>,

    /// widest the bar may grow, in columns [default: 80]
    #[clap(long)]
    max_width: Option<u16>,

    /// show version and exit
    #[clap(long)]
    version: bool,
}

impl Cli {
    pub fn command_for(mode: Mode) -> clap::Command {
        let name: &'static str = mode.into();
        Cli::command()
            .name(name)
            .bin_name(name)
            .override_usage(mode.usage())
    }

    pub fn try_parse_for<I, T>(mode: Mode, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Cli::command_for(mode).try_get_matches_from(args)?;
        Cli::from_arg_matches(&matches)
    }

    /// The one positional argument.
    pub fn when(&self) -> Result<&str, AppError> {
        match self.when.as_slice() {
            [input] => Ok(input),
            other => Err(AppError::ArgumentCount(other.len())),
        }
    }
}

/// How long to count down for, rejecting deadlines that are not in the future.
pub fn target_duration<Tz: TimeZone>(
    mode: Mode,
    input: &str,
    now: &DateTime<Tz>,
) -> Result<Duration, AppError> {
    let end = mode.resolve(input, now)?;
    (end - now.clone())
        .to_std()
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| AppError::PastDeadline(input.to_string()))
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "off")).try_init();
}

fn program_name(args: &[OsString]) -> Option<String> {
    args.first()
        .and_then(|arg0| Path::new(arg0).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// Entry point shared by both binaries. The invoked name picks the mode,
/// falling back to `default_mode` when it is neither `back-at` nor `back-in`.
pub fn main_for(default_mode: Mode) -> ExitCode {
    init_logging();

    let args: Vec<OsString> = std::env::args_os().collect();
    let program = program_name(&args).unwrap_or_else(|| default_mode.to_string());
    let mode = Mode::from_program_name(&program).unwrap_or(default_mode);

    match run(mode, &program, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(err)) if err.kind() == ErrorKind::DisplayHelp => {
            eprint!("{}", err.render());
            ExitCode::SUCCESS
        }
        Err(AppError::Usage(err)) => {
            let rendered = err.render().to_string();
            eprintln!("{}", rendered.lines().next().unwrap_or("error: bad arguments"));
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

pub fn run<I, T>(mode: Mode, program: &str, args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_for(mode, args)?;

    if cli.version {
        println!("{} version {}", program, VERSION);
        return Ok(());
    }

    let input = cli.when()?;
    let clock = SystemClock;
    let target = target_duration(mode, input, &Local::now())?;
    let start = clock.now();

    let settings = Settings::resolve(
        cli.prefix.clone(),
        cli.max_width,
        &FileConfigStore::new().load(),
    );
    let mut countdown = Countdown::new(&settings, start, target)?;

    if !stdin().is_tty() {
        return Err(AppError::NotATty);
    }

    info!("{} {}: {:?} to go", mode, input, target);
    show(&mut countdown, &clock)
}

fn show<C: Clock>(countdown: &mut Countdown, clock: &C) -> Result<(), AppError> {
    enable_raw_mode()?;
    let result = start_tui(countdown, clock);
    let restored = disable_raw_mode();
    println!();
    result?;
    restored?;
    Ok(())
}

fn start_tui<C: Clock>(countdown: &mut Countdown, clock: &C) -> Result<(), AppError> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(1),
        },
    )?;
    let (cols, _) = crossterm::terminal::size()?;
    let mut runner = Runner::new(CrosstermEventSource::new());

    drive(&mut terminal, &mut runner, countdown, clock, cols)
}

/// The event loop: feed each event to the countdown, redraw, carry out the
/// effect, until the countdown quits or input and timers run dry.
pub fn drive<B: Backend, E: EventSource, C: Clock>(
    terminal: &mut Terminal<B>,
    runner: &mut Runner<E>,
    countdown: &mut Countdown,
    clock: &C,
    width: u16,
) -> Result<(), AppError> {
    countdown.update(Event::Resize(width), clock.now());
    let mut flow = runner.apply(countdown.init(), clock.now());
    terminal.draw(|f| f.render_widget(CountdownView::new(countdown, clock.now()), f.area()))?;

    while flow.is_continue() {
        let Some(event) = runner.step(clock) else {
            break;
        };
        let effect = countdown.update(event, clock.now());
        terminal.draw(|f| f.render_widget(CountdownView::new(countdown, clock.now()), f.area()))?;
        flow = runner.apply(effect, clock.now());
    }

    terminal.show_cursor()?;
    Ok(())
}
