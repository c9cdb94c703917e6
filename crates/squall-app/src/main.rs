//! squall interactive shell entry point.
//!
//! Reads lines with rustyline (in-memory history, tab completion),
//! dispatches them through the command registry, and keeps going until
//! `exit` or end of input.

mod editor;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use editor::ShellHelper;
use squall_shell::progress::ProgressBar;
use squall_shell::{Console, Control, Registry, Session, register_builtins};
use squall_types::ShellConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::info!("Starting squall v{}", squall_shell::VERSION);

    let config = ShellConfig::load(Path::new(".")).context("loading squall.toml")?;

    let mut registry = Registry::new();
    register_builtins(&mut registry).context("registering built-in commands")?;
    let registry = Arc::new(registry);

    let console = Console::new();
    console.banner(squall_shell::VERSION);
    intro_table(&console, &registry);

    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::new().context("initializing the line editor")?;
    rl.set_helper(Some(ShellHelper::new(Arc::clone(&registry))));

    loop {
        let line = match rl.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                console.alert("Good Bye!");
                break;
            },
            Err(e) => return Err(e).context("reading input"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line).context("recording history")?;

        if line == "load" {
            loading_demo();
            continue;
        }

        let mut session = Session {
            registry: &registry,
            console: &console,
            config: &config,
        };
        match registry.execute(line, &mut session) {
            Ok(Control::Continue) => {},
            Ok(Control::Exit) => break,
            Err(e) => console.error(&e.to_string()),
        }
    }

    log::info!("squall shut down cleanly");
    Ok(())
}

/// The three-row starter table shown under the banner.
fn intro_table(console: &Console, registry: &Registry) {
    let rows: Vec<(String, String)> = registry
        .entries()
        .take(3)
        .map(|cmd| (cmd.name().to_string(), cmd.description().to_string()))
        .collect();
    console.table("Available commands", &rows);
}

/// Cosmetic loading animation behind the undocumented `load` input.
fn loading_demo() {
    let mut bar = ProgressBar::new("Loading...", 100);
    for _ in 0..100 {
        bar.advance(1);
    }
    bar.finish();
}
