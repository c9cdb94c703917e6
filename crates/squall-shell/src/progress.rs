//! In-place progress reporting for long-running commands.

use std::io::{self, Write};

/// A fixed-width progress bar redrawn in place on the current line.
///
/// State updates and drawing are coupled: [`advance`](Self::advance)
/// repaints the bar after every step, and [`finish`](Self::finish)
/// fills it and moves to the next line.
pub struct ProgressBar {
    label: String,
    total: u64,
    current: u64,
    width: usize,
}

impl ProgressBar {
    /// Bar body width in cells.
    const WIDTH: usize = 30;

    pub fn new(label: &str, total: u64) -> Self {
        Self {
            label: label.to_string(),
            total,
            current: 0,
            width: Self::WIDTH,
        }
    }

    /// Advance by `n` units, clamped to the total, and redraw.
    pub fn advance(&mut self, n: u64) {
        self.current = self.current.saturating_add(n).min(self.total);
        self.draw();
    }

    /// Fill the bar and move to the next line.
    pub fn finish(&mut self) {
        self.current = self.total;
        self.draw();
        println!();
    }

    /// Clear the bar line, run `f` (which may print whole lines), then
    /// redraw the bar below its output.
    pub fn suspend(&self, f: impl FnOnce()) {
        let blank = " ".repeat(self.render().chars().count());
        print!("\r{blank}\r");
        f();
        self.draw();
    }

    /// Completed fraction in percent. An empty bar (total of zero)
    /// reads as complete.
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            100
        } else {
            self.current.saturating_mul(100) / self.total
        }
    }

    /// Number of filled cells in the bar body.
    fn filled(&self) -> usize {
        if self.total == 0 {
            self.width
        } else {
            (self.width as u64 * self.current / self.total) as usize
        }
    }

    fn render(&self) -> String {
        let filled = self.filled();
        let bar: String = "█".repeat(filled) + &"░".repeat(self.width - filled);
        format!("{} [{bar}] {}%", self.label, self.percent())
    }

    fn draw(&self) {
        print!("\r{}", self.render());
        let _ = io::stdout().flush();
    }
}
