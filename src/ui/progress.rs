//! Terminal progress bars

use colored::{Color, Colorize};
use std::{
    io::{self, Write},
    time::Duration,
};

use super::Renderer;
use crate::engine::{Phase, ProgressEvent};

const BAR_WIDTH: usize = 40;

/// Renders one progress line per phase, redrawn in place on every event
///
/// When the session is bounded an overall `Total` bar is appended to each line.
pub struct Progress<W: Write> {
    out: W,
    total_phases: u32,
    phases_done: u32,
    current_phase_num: Option<u32>,
    line_open: bool,
}

impl<W: Write> Progress<W> {
    /// Create a progress display. An overall bar is shown if `total_phases > 0`.
    pub fn new(total_phases: u32, out: W) -> Self {
        Self {
            out,
            total_phases,
            phases_done: 0,
            current_phase_num: None,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn show_overall(&self) -> bool {
        self.total_phases > 0
    }

    fn render_line(&self, event: &ProgressEvent) -> String {
        let color = phase_color(event.phase);
        let mut line = format!(
            "{} {} {}",
            phase_label(event).color(color),
            bar(event.fraction, color),
            format!(
                "{}/{}",
                format_duration(event.elapsed),
                format_duration(event.total)
            )
            .dimmed()
        );

        if self.show_overall() {
            let fraction = f64::from(self.phases_done) / f64::from(self.total_phases);
            line.push_str(&format!(
                "  {} {} {}",
                "Total".color(Color::White),
                bar(fraction, Color::White),
                format!("{}/{}", self.phases_done, self.total_phases).dimmed()
            ));
        }

        line
    }

    fn end_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for Progress<W> {
    fn update(&mut self, event: &ProgressEvent) -> io::Result<()> {
        if self.current_phase_num != Some(event.phase_num) {
            self.end_line()?;
            self.current_phase_num = Some(event.phase_num);
        }

        if event.phase_complete {
            self.phases_done += 1;
        }

        write!(self.out, "\r{}", self.render_line(event))?;
        self.line_open = true;

        if event.phase_complete {
            self.end_line()?;
        }
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.end_line()?;
        self.out.flush()
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Work => Color::Red,
        Phase::ShortBreak => Color::Cyan,
        Phase::LongBreak => Color::Green,
        Phase::Done => Color::White,
    }
}

/// Phase name, with the cycle counter when the session is bounded
///
/// Breaks show the cycle that just finished.
fn phase_label(event: &ProgressEvent) -> String {
    if event.total_cycles == 0 {
        return event.phase.to_string();
    }

    let cycle = match event.phase {
        Phase::Work => event.cycle_num,
        _ => event.cycle_num.saturating_sub(1),
    };
    format!("{} ({}/{})", event.phase, cycle, event.total_cycles)
}

fn bar(fraction: f64, color: Color) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;

    let body = match filled {
        0 => "-".repeat(BAR_WIDTH),
        n if n >= BAR_WIDTH => "=".repeat(BAR_WIDTH).color(color).to_string(),
        n => format!(
            "{}{}",
            format!("{}>", "=".repeat(n - 1)).color(color),
            "-".repeat(BAR_WIDTH - n)
        ),
    };
    format!("[{}]", body)
}

/// Format as `MM:SS`, rounded to the nearest second
pub fn format_duration(duration: Duration) -> String {
    let secs = (duration.as_millis() + 500) / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
