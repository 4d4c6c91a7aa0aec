//! Interactive prompting
//!
//! Everything the run lifecycle asks the user goes through [`Prompter`], so
//! the orchestration can be driven by scripted answers in tests.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::error::{Result, RunError};

/// Source of answers to interactive questions
pub trait Prompter: Send {
    /// Asks for a free-form value
    ///
    /// An empty answer selects `default` when one is given; without a
    /// default the empty string is returned.
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String>;

    /// Asks a yes/no question
    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;
}

/// Interprets a yes/no answer; `None` for anything unrecognized
pub fn parse_confirmation(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolves a free-form answer against its default
pub fn resolve_input(answer: &str, default: Option<&str>) -> String {
    let answer = answer.trim();
    match (answer.is_empty(), default) {
        (true, Some(default)) => default.to_string(),
        _ => answer.to_string(),
    }
}

/// Prompts on the terminal, reading answers from standard input
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    /// Prints `prompt` and blocks until a line is read from standard input
    fn read_line(&self, prompt: &str) -> Result<String> {
        run_blocking(|| {
            print!("{}", prompt);
            io::stdout()
                .flush()
                .map_err(|e| RunError::Prompt(e.to_string()))?;
            read_answer(&mut io::stdin().lock())
        })
    }
}

/// Reads one answer line; a closed input is an error
fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| RunError::Prompt(e.to_string()))?;
    if read == 0 {
        return Err(RunError::Prompt("standard input closed".to_string()));
    }
    Ok(line)
}

/// Runs a blocking call from async code
///
/// On a multi-threaded runtime the worker thread is handed over with
/// `block_in_place` first. `block_in_place` panics on a current-thread
/// runtime, where the call simply blocks.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    let multi_thread = Handle::try_current()
        .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);
    if multi_thread {
        tokio::task::block_in_place(f)
    } else {
        f()
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let prompt = match default.filter(|d| !d.is_empty()) {
            Some(default) => format!("{} {}: ", label.cyan(), format!("[{}]", default).dimmed()),
            None => format!("{}: ", label.cyan()),
        };
        let answer = self.read_line(&prompt)?;
        Ok(resolve_input(&answer, default))
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.read_line(&format!("{} {}: ", label.yellow(), hint.dimmed()))?;
            match parse_confirmation(&answer, default) {
                Some(choice) => return Ok(choice),
                None => println!("{}", "Please answer y or n.".red()),
            }
        }
    }
}
