//! Styled terminal output.
//!
//! Commands hand finished lines to the [`Console`] instead of printing
//! directly, so all color and layout decisions live in one place.
//! Rendering is fire-and-forget; nothing is read back.

use std::io::{self, Write};

use colored::Colorize;

/// Renders shell output to the terminal.
pub struct Console;

impl Console {
    pub fn new() -> Self {
        Self
    }

    /// Print a line with no styling applied (the text may already
    /// carry its own).
    pub fn plain(&self, text: &str) {
        println!("{text}");
    }

    /// Informational line (bold cyan).
    pub fn info(&self, text: &str) {
        println!("{}", text.cyan().bold());
    }

    /// Success line (bold green).
    pub fn success(&self, text: &str) {
        println!("{}", text.green().bold());
    }

    /// Section heading (bold yellow).
    pub fn heading(&self, text: &str) {
        println!("{}", text.yellow().bold());
    }

    /// Attention line in bold red on stdout. Not an error report;
    /// used for farewells and empty search results.
    pub fn alert(&self, text: &str) {
        println!("{}", text.red().bold());
    }

    /// Error report on stderr.
    pub fn error(&self, text: &str) {
        eprintln!("{} {text}", "error:".red().bold());
    }

    /// Boxed welcome banner.
    pub fn banner(&self, version: &str) {
        // Width is computed from the unstyled text; ANSI escapes have
        // no printable width.
        let inner_len = "Welcome to squall v".len() + version.len();
        let inner = format!(
            "{}{}{}",
            "Welcome to ".yellow().bold(),
            "squall".magenta().bold(),
            format!(" v{version}").cyan().bold(),
        );
        let horizontal = "─".repeat(inner_len + 2);
        println!("{}", format!("╭{horizontal}╮").magenta().bold());
        println!("{} {inner} {}", "│".magenta().bold(), "│".magenta().bold());
        println!("{}", format!("╰{horizontal}╯").magenta().bold());
    }

    /// Two-column table under a heading. The first column is padded to
    /// a shared width before styling so the escape codes do not skew
    /// the alignment.
    pub fn table(&self, title: &str, rows: &[(String, String)]) {
        self.heading(title);
        let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, desc) in rows {
            println!("  {}  {desc}", format!("{name:<width$}").cyan());
        }
    }

    /// Clear the screen and home the cursor.
    pub fn clear(&self) {
        print!("\x1b[2J\x1b[1;1H");
        let _ = io::stdout().flush();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
