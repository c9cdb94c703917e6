//! Tab completion.
//!
//! A pure function over the text before the cursor. The line editor calls
//! it on every completion keystroke, so it does no I/O and no blocking
//! work; everything it knows comes from the registry.

use crate::interpreter::Registry;

/// One completion suggestion.
///
/// `span` is the byte length of the token being replaced: the editor
/// substitutes `text` for that many characters immediately before the
/// cursor. An empty line completes with span 0 (pure insertion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub span: usize,
}

impl Candidate {
    fn new(text: &str, span: usize) -> Self {
        Self {
            text: text.to_string(),
            span,
        }
    }
}

/// Compute completions for `input`, the text before the cursor.
///
/// Four cases, checked in order:
/// - nothing typed: every canonical name, in registration order;
/// - one token: canonical names with that case-sensitive prefix;
/// - `info` plus arguments: canonical names matching the second token,
///   since `info` takes a command name;
/// - any other command plus arguments: the command's declared argument
///   names matching the last token, if the first token resolves exactly
///   (canonical as typed, or alias).
pub fn complete(registry: &Registry, input: &str) -> Vec<Candidate> {
    let words: Vec<&str> = input.split_whitespace().collect();

    match words.as_slice() {
        [] => registry
            .names()
            .map(|name| Candidate::new(name, 0))
            .collect(),

        [token] => registry
            .names()
            .filter(|name| name.starts_with(token))
            .map(|name| Candidate::new(name, token.len()))
            .collect(),

        [first, arg, ..] if *first == "info" => registry
            .names()
            .filter(|name| name.starts_with(arg))
            .map(|name| Candidate::new(name, arg.len()))
            .collect(),

        [first, .., last] => match registry.resolve_exact(first) {
            Some(cmd) => cmd
                .arg_names()
                .iter()
                .filter(|arg| arg.starts_with(last))
                .map(|&arg| Candidate::new(arg, last.len()))
                .collect(),
            None => Vec::new(),
        },
    }
}
