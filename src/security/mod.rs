pub mod denylist;

pub use denylist::{DenyMatch, Denylist, MatchMode, is_dangerous};

/// Fragments that block a command from running.
///
/// This is a nag screen, not a security boundary. Matching is plain substring
/// search over the lowercased command, so `dd` also matches `add` and
/// `address`, and a determined operator (or model) can trivially route around
/// it. See [`MatchMode::Token`] for the opt-in stricter matching.
pub const DENYLIST: &[&str] = &[
    // Deletion
    "rm",
    // Power state
    "shutdown",
    "reboot",
    // Filesystems and raw devices
    "mkfs",
    "dd",
    // Fork bomb
    ":(){:|:&};:",
    // Remote script piped into a shell
    "curl | sh",
];
