use chrono::{DateTime, Local, NaiveDateTime};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One executed command
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLogEntry {
    pub timestamp: NaiveDateTime,
    pub command: String,
}

impl ExecutionLogEntry {
    /// Parse a `[timestamp] command` line
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (stamp, command) = rest.split_once("] ")?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        Some(Self {
            timestamp,
            command: command.to_string(),
        })
    }
}

/// Append-only record of commands that actually ran.
///
/// The file is opened, appended and closed on every write. There is no
/// rotation.
#[derive(Debug, Clone)]
pub struct ExecutionLog {
    log_path: PathBuf,
}

impl ExecutionLog {
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Append `[timestamp] command`
    pub fn append(&self, command: &str) -> std::io::Result<()> {
        self.append_at(Local::now(), command)
    }

    fn append_at(&self, at: DateTime<Local>, command: &str) -> std::io::Result<()> {
        // One entry per line, whatever the command looked like
        let command = command.replace("\r\n", " ").replace(['\r', '\n'], " ");
        let log_entry = format!("[{}] {}\n", at.format(TIMESTAMP_FORMAT), command);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(log_entry.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Read back every well-formed entry
    pub fn entries(&self) -> std::io::Result<Vec<ExecutionLogEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.log_path)?;
        Ok(content.lines().filter_map(ExecutionLogEntry::parse).collect())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nested").join("rayi.log");

        let log = ExecutionLog::with_path(&log_path).unwrap();
        assert_eq!(log.log_path(), log_path);
        assert!(log_path.parent().unwrap().exists());
        assert!(!log_path.exists());
    }

    #[test]
    fn test_append_format() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("rayi.log");
        let log = ExecutionLog::with_path(&log_path).unwrap();

        log.append("ls -la").unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.starts_with('['));
        assert!(content.ends_with("] ls -la\n"));
    }

    #[test]
    fn test_multiple_entries() {
        let temp_dir = TempDir::new().unwrap();
        let log = ExecutionLog::with_path(temp_dir.path().join("rayi.log")).unwrap();

        log.append("ls").unwrap();
        log.append("pwd").unwrap();
        log.append("whoami").unwrap();

        let entries = log.entries().unwrap();
        let commands: Vec<&str> = entries.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, ["ls", "pwd", "whoami"]);
    }

    #[test]
    fn test_multiline_command_stays_one_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log = ExecutionLog::with_path(temp_dir.path().join("rayi.log")).unwrap();

        log.append("echo a\necho b").unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].command, "echo a echo b");
    }

    #[test]
    fn test_carriage_returns_stay_one_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("rayi.log");
        let log = ExecutionLog::with_path(&log_path).unwrap();

        log.append("echo a\r\necho b\recho c").unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(!content.contains('\r'));
        assert_eq!(content.matches('\n').count(), 1);
        assert_eq!(log.entries().unwrap()[0].command, "echo a echo b echo c");
    }

    #[test]
    fn test_parse_entry() {
        let entry = ExecutionLogEntry::parse("[2025-01-02 03:04:05.000006] git status").unwrap();
        assert_eq!(entry.command, "git status");
        assert_eq!(
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-01-02 03:04:05"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ExecutionLogEntry::parse("no brackets").is_none());
        assert!(ExecutionLogEntry::parse("[not a time] ls").is_none());
    }

    #[test]
    fn test_entries_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let log = ExecutionLog::with_path(temp_dir.path().join("absent.log")).unwrap();
        assert!(log.entries().unwrap().is_empty());
    }
}
