use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Watches one file for tasks written into it
#[derive(Debug)]
pub struct TriggerWatcher {
    path: PathBuf,
    last_seen: Option<String>,
}

impl TriggerWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_seen: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Read the file once and return a new task if there is one.
    ///
    /// A missing file, blank content or a repeat of the last task yields
    /// `None`. A new task is remembered and the file is truncated.
    pub fn poll_once(&mut self) -> io::Result<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        let task = contents.trim();
        if task.is_empty() || self.last_seen.as_deref() == Some(task) {
            return Ok(None);
        }

        let task = task.to_string();
        self.last_seen = Some(task.clone());
        fs::write(&self.path, "")?;

        Ok(Some(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_quiet() {
        let temp = TempDir::new().unwrap();
        let mut watcher = TriggerWatcher::new(temp.path().join("ray_input.txt"));
        assert_eq!(watcher.poll_once().unwrap(), None);
    }

    #[test]
    fn test_picks_up_and_truncates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ray_input.txt");
        fs::write(&path, "  list files\n").unwrap();

        let mut watcher = TriggerWatcher::new(&path);
        assert_eq!(watcher.poll_once().unwrap(), Some("list files".to_string()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(watcher.last_seen(), Some("list files"));

        assert_eq!(watcher.poll_once().unwrap(), None);
    }

    #[test]
    fn test_repeat_of_last_task_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ray_input.txt");
        let mut watcher = TriggerWatcher::new(&path);

        fs::write(&path, "update system").unwrap();
        assert!(watcher.poll_once().unwrap().is_some());

        fs::write(&path, "update system").unwrap();
        assert_eq!(watcher.poll_once().unwrap(), None);

        fs::write(&path, "check disk").unwrap();
        assert_eq!(watcher.poll_once().unwrap(), Some("check disk".to_string()));
    }

    #[test]
    fn test_blank_content_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ray_input.txt");
        fs::write(&path, "   \n\t").unwrap();

        let mut watcher = TriggerWatcher::new(&path);
        assert_eq!(watcher.poll_once().unwrap(), None);
        assert_eq!(watcher.last_seen(), None);
    }
}
