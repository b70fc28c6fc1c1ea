use crate::security::DENYLIST;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `curl ... | sh`, `wget -qO- ... | sudo bash` and friends
static PIPE_TO_SHELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:curl|wget)\b[^|]*\|\s*(?:sudo\s+)?(?:ba|z|da|k)?sh\b")
        .expect("pipe-to-shell pattern is valid")
});

const PIPE_TO_SHELL_LABEL: &str = "download piped into a shell";

/// How denylist fragments are matched against a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Fragment anywhere in the command. `dd` matches `git add`.
    #[default]
    Substring,
    /// Word-like fragments must be a whole shell word (`rm`, `/bin/rm`),
    /// symbol fragments still match anywhere.
    Token,
}

/// Which rule stopped a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenyMatch {
    pub fragment: &'static str,
}

/// Best-effort screen for destructive commands.
///
/// Not a security boundary: it only inspects the command text and has no
/// understanding of shell syntax, aliases, scripts or encodings.
#[derive(Debug, Clone)]
pub struct Denylist {
    mode: MatchMode,
    fragments: Vec<&'static str>,
}

impl Denylist {
    pub fn new() -> Self {
        Self::with_mode(MatchMode::default())
    }

    pub fn with_mode(mode: MatchMode) -> Self {
        Self {
            mode,
            fragments: DENYLIST.to_vec(),
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Return the first rule the command trips, if any
    pub fn check(&self, command: &str) -> Option<DenyMatch> {
        let lowered = command.to_lowercase();
        let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();

        for &fragment in &self.fragments {
            let hit = if is_symbolic(fragment) {
                // Fork bombs are usually written with spaces
                compact.contains(fragment)
            } else if self.mode == MatchMode::Token && is_word(fragment) {
                shell_words(&lowered).any(|word| word == fragment)
            } else {
                lowered.contains(fragment)
            };

            if hit {
                return Some(DenyMatch { fragment });
            }
        }

        if PIPE_TO_SHELL.is_match(&lowered) {
            return Some(DenyMatch {
                fragment: PIPE_TO_SHELL_LABEL,
            });
        }

        None
    }

    pub fn is_dangerous(&self, command: &str) -> bool {
        self.check(command).is_some()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a command against the default substring denylist
pub fn is_dangerous(command: &str) -> bool {
    Denylist::new().is_dangerous(command)
}

fn is_symbolic(fragment: &str) -> bool {
    !fragment.chars().any(|c| c.is_alphanumeric() || c.is_whitespace())
}

fn is_word(fragment: &str) -> bool {
    fragment.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Split on whitespace and shell operators, reducing paths to their basename
fn shell_words(command: &str) -> impl Iterator<Item = &str> {
    command
        .split(|c: char| c.is_whitespace() || ";&|()`<>".contains(c))
        .filter(|word| !word.is_empty())
        .map(|word| word.rsplit('/').next().unwrap_or(word))
}
