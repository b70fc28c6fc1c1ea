use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

/// How a message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    Error,
    /// A command the operator is about to approve
    Command,
}

/// The operator's side of the conversation
pub trait Console: Send {
    /// Prompt and read one line without its terminator. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn show(&mut self, tone: Tone, message: &str);

    fn say(&mut self, message: &str) {
        self.show(Tone::Plain, message);
    }
}

/// Read lines until an empty line or end of input
pub fn read_until_blank(console: &mut dyn Console, prompt: &str) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    while let Some(line) = console.read_line(prompt)? {
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Terminal console on stdin/stdout
pub struct StdConsole {
    color: bool,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }

        let line = input.trim_end_matches(['\n', '\r']).to_string();
        Ok(Some(line))
    }

    fn show(&mut self, tone: Tone, message: &str) {
        if !self.color {
            println!("{}", message);
            return;
        }

        match tone {
            Tone::Plain => println!("{}", message),
            Tone::Success => println!("{}", message.green()),
            Tone::Warning => println!("{}", message.yellow()),
            Tone::Error => eprintln!("{}", message.red()),
            Tone::Command => println!("{}", message.green().bold()),
        }
    }
}

/// Records everything shown; reads always hit end of input
#[cfg(test)]
#[derive(Default)]
pub(crate) struct Transcript {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl Transcript {
    pub fn printed(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

#[cfg(test)]
impl Console for Transcript {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn show(&mut self, _tone: Tone, message: &str) {
        self.lines.push(message.to_string());
    }
}
