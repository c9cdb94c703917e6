//! Built-in shell commands.
//!
//! Each command is a small struct implementing [`Command`];
//! [`register_builtins`] installs them all in the order the
//! `commands` listing and completion present them.

use std::fs::{self, File};
use std::io::Write;

use colored::Colorize;
use squall_types::error::{Result, SquallError};

use crate::VERSION;
use crate::eval;
use crate::http;
use crate::interpreter::{Command, Control, Registry, Session};
use crate::progress::ProgressBar;
use crate::search;

/// Write granularity for the download progress bar.
const DOWNLOAD_CHUNK: usize = 64 * 1024;

/// Register every built-in command.
///
/// Fails on name or alias collisions, which is fatal at startup.
pub fn register_builtins(reg: &mut Registry) -> Result<()> {
    reg.register(Box::new(VersionCmd))?;
    reg.register(Box::new(CommandsCmd))?;
    reg.register(Box::new(InfoCmd))?;
    reg.register(Box::new(GreetCmd))?;
    reg.register(Box::new(LocateCmd))?;
    reg.register(Box::new(DownloadCmd))?;
    reg.register(Box::new(CalcCmd))?;
    reg.register(Box::new(ClearCmd))?;
    reg.register(Box::new(ExitCmd))?;
    Ok(())
}

/// Name plus parenthesized aliases, e.g. `download (dl)`.
fn display_name(cmd: &dyn Command) -> String {
    if cmd.aliases().is_empty() {
        cmd.name().to_string()
    } else {
        format!("{} ({})", cmd.name(), cmd.aliases().join(", "))
    }
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

struct VersionCmd;

impl Command for VersionCmd {
    fn name(&self) -> &str {
        "version"
    }

    fn description(&self) -> &str {
        "Shows the current version of squall"
    }

    fn usage(&self) -> &str {
        "version"
    }

    fn execute(&self, _args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        session
            .console
            .plain(&"squall".magenta().bold().to_string());
        session.console.info(&format!("Version: {VERSION}"));
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// commands
// ---------------------------------------------------------------------------

struct CommandsCmd;

impl Command for CommandsCmd {
    fn name(&self) -> &str {
        "commands"
    }

    fn description(&self) -> &str {
        "Lists all available commands"
    }

    fn usage(&self) -> &str {
        "commands"
    }

    fn execute(&self, _args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        session.console.heading("Available commands:");
        for cmd in session.registry.entries() {
            session
                .console
                .plain(&format!("- {}", display_name(cmd).cyan()));
        }
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

struct InfoCmd;

impl Command for InfoCmd {
    fn name(&self) -> &str {
        "info"
    }

    fn description(&self) -> &str {
        "Shows information about a specific command"
    }

    fn usage(&self) -> &str {
        "info [command]"
    }

    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        let Some(name) = args.first() else {
            return Err(SquallError::Command("usage: info [command]".to_string()));
        };
        let Some(cmd) = session.registry.resolve(name) else {
            return Err(SquallError::Command(format!("no such command: '{name}'")));
        };
        session.console.plain(&format!(
            "{} {}",
            "Information about command:".green().bold(),
            cmd.name(),
        ));
        session
            .console
            .plain(&format!("{}. Usage: {}.", cmd.description(), cmd.usage()));
        if !cmd.aliases().is_empty() {
            session
                .console
                .plain(&format!("Aliases: {}", cmd.aliases().join(", ")));
        }
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// greet
// ---------------------------------------------------------------------------

struct GreetCmd;

impl Command for GreetCmd {
    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Greets a person X times"
    }

    fn usage(&self) -> &str {
        "greet [name] [times]"
    }

    fn arg_names(&self) -> &[&str] {
        &["name", "times"]
    }

    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        let Some(name) = args.first() else {
            return Err(SquallError::Command(
                "usage: greet [name] [times]".to_string(),
            ));
        };
        let times: i64 = match args.get(1) {
            Some(raw) => raw.parse().map_err(|_| {
                SquallError::Command(format!("times must be a number, got '{raw}'"))
            })?,
            None => 1,
        };

        // A negative count greets nobody; the bar still completes.
        let count = times.max(0) as u64;
        let console = session.console;
        let mut bar = ProgressBar::new(&format!("Sending greetings to {name}..."), count);
        for _ in 0..count {
            bar.advance(1);
            bar.suspend(|| console.success(&format!("Hello, {name}!")));
        }
        bar.finish();
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// locate
// ---------------------------------------------------------------------------

struct LocateCmd;

impl Command for LocateCmd {
    fn name(&self) -> &str {
        "locate"
    }

    fn description(&self) -> &str {
        "Finds files in the filesystem"
    }

    fn usage(&self) -> &str {
        "locate [filename]"
    }

    fn arg_names(&self) -> &[&str] {
        &["filename"]
    }

    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        let Some(filename) = args.first() else {
            return Err(SquallError::Command("usage: locate [filename]".to_string()));
        };
        let root = session.config.search_root.as_path();
        session.console.info(&format!(
            "Searching for '{filename}' in Directory {}...",
            root.display(),
        ));

        let total = search::count_dirs(root);
        let mut bar = ProgressBar::new("Searching...", total);
        let found = search::find_files(root, filename, &mut || bar.advance(1));
        bar.finish();

        if found.is_empty() {
            session
                .console
                .alert(&format!("No file found named: '{filename}'"));
        } else {
            session.console.success("Found file(s):");
            for path in &found {
                session.console.plain(&path.display().to_string());
            }
        }
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// download
// ---------------------------------------------------------------------------

struct DownloadCmd;

impl Command for DownloadCmd {
    fn name(&self) -> &str {
        "download"
    }

    fn description(&self) -> &str {
        "Downloads a file over HTTP"
    }

    fn usage(&self) -> &str {
        "download [url]"
    }

    fn aliases(&self) -> &[&str] {
        &["dl"]
    }

    fn arg_names(&self) -> &[&str] {
        &["url"]
    }

    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        let Some(raw) = args.first() else {
            return Err(SquallError::Command("usage: download [url]".to_string()));
        };
        let url = http::Url::parse(raw)
            .ok_or_else(|| SquallError::Command(format!("invalid url: '{raw}'")))?;

        session.console.info(&format!("Downloading {url}..."));
        let resp = http::get(&url)?;
        if !(200..300).contains(&resp.status_code) {
            return Err(SquallError::Net(format!(
                "server returned status {}",
                resp.status_code,
            )));
        }

        fs::create_dir_all(&session.config.download_dir)?;
        let target = session.config.download_dir.join(url.filename());
        let mut file = File::create(&target)?;

        let mut bar = ProgressBar::new("Downloading...", resp.body.len() as u64);
        for chunk in resp.body.chunks(DOWNLOAD_CHUNK) {
            file.write_all(chunk)?;
            bar.advance(chunk.len() as u64);
        }
        bar.finish();

        session.console.success(&format!(
            "Saved {} bytes to {}",
            resp.body.len(),
            target.display(),
        ));
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// calc
// ---------------------------------------------------------------------------

struct CalcCmd;

impl Command for CalcCmd {
    fn name(&self) -> &str {
        "calc"
    }

    fn description(&self) -> &str {
        "Evaluates an arithmetic expression"
    }

    fn usage(&self) -> &str {
        "calc [expression]"
    }

    fn aliases(&self) -> &[&str] {
        &["c"]
    }

    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        if args.is_empty() {
            return Err(SquallError::Command("usage: calc [expression]".to_string()));
        }
        let expr = args.join(" ");
        let value = eval::evaluate(&expr).map_err(|e| SquallError::Eval(e.to_string()))?;
        session.console.success(&value.to_string());
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;

impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }

    fn description(&self) -> &str {
        "Clears the screen"
    }

    fn usage(&self) -> &str {
        "clear"
    }

    fn execute(&self, _args: &[&str], session: &mut Session<'_>) -> Result<Control> {
        session.console.clear();
        Ok(Control::Continue)
    }
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;

impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }

    fn description(&self) -> &str {
        "Exits the shell"
    }

    fn usage(&self) -> &str {
        "exit"
    }

    fn execute(&self, _args: &[&str], _session: &mut Session<'_>) -> Result<Control> {
        Ok(Control::Exit)
    }
}
