//! rustyline integration for the shell prompt.

use std::borrow::Cow;
use std::sync::Arc;

use colored::Colorize;
use rustyline::Helper;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};

use squall_shell::Registry;

/// Bridges the registry-driven completion engine into rustyline and
/// styles the prompt.
pub struct ShellHelper {
    registry: Arc<Registry>,
}

impl ShellHelper {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Completion candidates for the text before the cursor, with the
    /// byte offset where the replacement starts.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let candidates = squall_shell::complete(&self.registry, &line[..pos]);
        // All candidates for one query replace the same token, so the
        // first span positions the whole set.
        let start = pos - candidates.first().map_or(0, |c| c.span);
        let pairs = candidates
            .into_iter()
            .map(|c| Pair {
                display: c.text.clone(),
                replacement: c.text,
            })
            .collect();
        (start, pairs)
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(prompt.magenta().bold().to_string())
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ShellHelper {}
