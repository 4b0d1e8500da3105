// Binary-level checks of the startup paths. None of these reach the
// interactive display, so no TTY is needed.
use assert_cmd::Command;

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_prints_name_and_exits_zero() {
    Command::cargo_bin("back-at")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("back-at version {}\n", env!("CARGO_PKG_VERSION")));

    Command::cargo_bin("back-in")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("back-in version {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_goes_to_stderr_per_mode() {
    let assert = Command::cargo_bin("back-in")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout("");
    assert!(stderr_of(assert.get_output()).contains("DURATION (e.g. 15m)"));

    let assert = Command::cargo_bin("back-at")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
    assert!(stderr_of(assert.get_output()).contains("HH:MM (or HH:MMpm)"));
}

#[test]
fn wrong_argument_count_exits_one() {
    let assert = Command::cargo_bin("back-at").unwrap().assert().code(1);
    assert!(stderr_of(assert.get_output()).starts_with("error: wrong number of arguments"));

    Command::cargo_bin("back-in")
        .unwrap()
        .args(["5m", "10m"])
        .assert()
        .code(1);
}

#[test]
fn unknown_time_format_exits_one() {
    let assert = Command::cargo_bin("back-at")
        .unwrap()
        .arg("6")
        .assert()
        .code(1);
    let stderr = stderr_of(assert.get_output());
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("unknown time format"), "{}", stderr);
}

#[test]
fn bad_durations_exit_one() {
    for input in ["soon", "0s", "15"] {
        let assert = Command::cargo_bin("back-in")
            .unwrap()
            .arg(input)
            .assert()
            .code(1);
        assert!(stderr_of(assert.get_output()).starts_with("error: "));
    }
}

#[test]
fn unknown_flag_exits_one() {
    let assert = Command::cargo_bin("back-at")
        .unwrap()
        .args(["--frobnicate", "14:00"])
        .assert()
        .code(1);
    assert_eq!(stderr_of(assert.get_output()).lines().count(), 1);
}

#[test]
fn non_tty_stdin_is_reported() {
    let assert = Command::cargo_bin("back-in")
        .unwrap()
        .arg("10m")
        .write_stdin("")
        .assert()
        .code(1);
    assert!(stderr_of(assert.get_output()).contains("stdin must be a tty"));
}
