use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::countdown::Countdown;
use crate::util::format_remaining;

const FULL: char = '█';
const EMPTY: char = '░';

/// A horizontal bar `width` cells wide, `fraction` of it filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBar {
    fraction: f64,
    width: u16,
}

impl ProgressBar {
    pub fn new(fraction: f64, width: u16) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            width,
        }
    }

    pub fn filled(&self) -> usize {
        let filled = (self.width as f64 * self.fraction).round() as usize;
        filled.min(self.width as usize)
    }

    pub fn empty(&self) -> usize {
        self.width as usize - self.filled()
    }

    pub fn text(&self) -> String {
        let mut s = String::with_capacity(self.width as usize * FULL.len_utf8());
        s.extend(std::iter::repeat(FULL).take(self.filled()));
        s.extend(std::iter::repeat(EMPTY).take(self.empty()));
        s
    }

    /// Blank placeholder as wide as the bar
    pub fn blank(&self) -> String {
        " ".repeat(self.width as usize)
    }
}

/// The countdown as seen at a given instant, drawable into a ratatui frame
pub struct CountdownView<'a> {
    countdown: &'a Countdown,
    now: Instant,
}

impl<'a> CountdownView<'a> {
    pub fn new(countdown: &'a Countdown, now: Instant) -> Self {
        Self { countdown, now }
    }
}

impl Widget for CountdownView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cd = self.countdown;
        // styles
        let filled_style = Style::default().fg(Color::Magenta);
        let empty_style = Style::default().fg(Color::DarkGray);
        let time_style = Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::DIM);

        let bar = cd.progress_bar();
        let mut spans = vec![Span::raw(cd.prefix())];

        if cd.bar_visible() {
            spans.push(Span::styled(
                FULL.to_string().repeat(bar.filled()),
                filled_style,
            ));
            spans.push(Span::styled(
                EMPTY.to_string().repeat(bar.empty()),
                empty_style,
            ));
        } else {
            spans.push(Span::raw(bar.blank()));
        }

        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format_remaining(cd.remaining(self.now)),
            time_style,
        ));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::config::Settings;
    use crate::runtime::Event;
    use std::time::Duration;

    fn buffer_line(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_bar_text() {
        assert_eq!(ProgressBar::new(0.0, 4).text(), "░░░░");
        assert_eq!(ProgressBar::new(0.5, 4).text(), "██░░");
        assert_eq!(ProgressBar::new(1.0, 4).text(), "████");
        assert_eq!(ProgressBar::new(0.5, 0).text(), "");
    }

    #[test]
    fn test_bar_rounds_and_clamps() {
        assert_eq!(ProgressBar::new(0.13, 10).filled(), 1);
        assert_eq!(ProgressBar::new(0.16, 10).filled(), 2);
        assert_eq!(ProgressBar::new(1.7, 10).filled(), 10);
        assert_eq!(ProgressBar::new(-0.2, 10).filled(), 0);
    }

    #[test]
    fn test_blank_matches_width() {
        let bar = ProgressBar::new(0.3, 12);
        assert_eq!(bar.blank().chars().count(), bar.text().chars().count());
    }

    #[test]
    fn test_widget_draws_frame_text() {
        let clock = ManualClock::new();
        let settings = Settings {
            prefix: "> ".to_string(),
            max_width: 80,
        };
        let mut cd = Countdown::new(&settings, clock.now(), Duration::from_secs(40)).unwrap();
        cd.update(Event::Resize(18), clock.now());
        clock.advance(Duration::from_secs(10));
        cd.update(Event::Tick, clock.now());

        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        CountdownView::new(&cd, clock.now()).render(area, &mut buf);

        let expected = cd.render(clock.now());
        assert_eq!(buffer_line(&buf).trim_end(), expected.trim_end());
        assert_eq!(buf[(2, 0)].fg, Color::Magenta);
        assert_eq!(buf[(3, 0)].fg, Color::Magenta);
        assert_eq!(buf[(4, 0)].fg, Color::DarkGray);
    }
}
