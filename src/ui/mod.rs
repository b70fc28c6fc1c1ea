pub mod console;

pub use console::{Console, StdConsole, Tone, read_until_blank};

#[cfg(test)]
pub(crate) use console::Transcript;

/// Printed when the interactive session starts
pub const BANNER: &str = "\
Ray-i activated. Tell me what you need.
  list the biggest files here        -> shell command (asks before running)
  !df -h                             -> run a command as typed (asks first)
  write a todo app in app.jsx        -> generate code into a file
  refactor app.py to use async       -> rewrite a file
  explain this                       -> paste code, end with an empty line
Type 'exit' or 'quit' to leave.";
