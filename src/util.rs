use std::time::Duration;

/// `MM:SS`, floored to whole seconds. Minutes wrap at 60, so hours are not shown.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}
