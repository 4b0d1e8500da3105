use std::process::ExitCode;

use backat::cli::{main_for, Mode};

fn main() -> ExitCode {
    main_for(Mode::In)
}
