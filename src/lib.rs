// Library surface for the two binaries and for headless/integration tests.
pub mod app_dirs;
pub mod cli;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod deadline;
pub mod error;
pub mod runtime;
pub mod ui;
pub mod util;
