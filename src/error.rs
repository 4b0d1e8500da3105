use std::fmt;
use std::fmt::Formatter;
use std::io;

use crate::countdown::CountdownError;
use crate::deadline::DeadlineError;

/// Everything that can stop the program before or while the bar is shown
#[derive(Debug)]
pub enum AppError {
    Usage(clap::Error),
    ArgumentCount(usize),
    Deadline(DeadlineError),
    PastDeadline(String),
    Countdown(CountdownError),
    NotATty,
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Usage(err) => write!(f, "{}", err.to_string().trim_end()),
            AppError::ArgumentCount(n) => {
                write!(f, "wrong number of arguments (expected 1, got {})", n)
            }
            AppError::Deadline(err) => write!(f, "{}", err),
            AppError::PastDeadline(input) => write!(f, "{} is in the past", input),
            AppError::Countdown(err) => write!(f, "{}", err),
            AppError::NotATty => write!(f, "stdin must be a tty"),
            AppError::Io(err) => write!(f, "terminal: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Usage(err) => Some(err),
            AppError::Deadline(err) => Some(err),
            AppError::Countdown(err) => Some(err),
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<DeadlineError> for AppError {
    fn from(err: DeadlineError) -> Self {
        AppError::Deadline(err)
    }
}

impl From<CountdownError> for AppError {
    fn from(err: CountdownError) -> Self {
        AppError::Countdown(err)
    }
}

impl From<clap::Error> for AppError {
    fn from(err: clap::Error) -> Self {
        AppError::Usage(err)
    }
}
