//! Rotating file writer with size-based rotation and backup retention.
//!
//! Backs the `file` exporter. The file is opened lazily on the first write so
//! that building a pipeline never touches the filesystem; a bad path surfaces
//! as an export error instead of an assembly error.

use super::sink::LineSink;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Default size threshold before rotation (10 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated backups kept next to the live file.
pub const DEFAULT_MAX_BACKUPS: usize = 3;

/// Thread-safe rotating file writer.
///
/// When the live file grows past `max_bytes` it is renamed to
/// `<file>.<unix-millis>` and a fresh file is started. Only the newest
/// `max_backups` rotated files are retained.
pub struct FileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    /// Lazily-opened handle.
    writer: Mutex<Option<File>>,
}

impl FileWriter {
    /// Creates a writer with the default rotation limits.
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_limits(file_path, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_BACKUPS)
    }

    /// Creates a writer with explicit rotation limits.
    pub const fn with_limits(file_path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            file_path,
            max_bytes,
            max_backups,
            writer: Mutex::new(None),
        }
    }

    /// Closes the current handle if the file has outgrown its limit and
    /// rotates it out of the way.
    fn check_and_rotate(&self, writer: &mut Option<File>) -> io::Result<()> {
        let Ok(metadata) = fs::metadata(&self.file_path) else {
            return Ok(());
        };
        if metadata.len() > self.max_bytes {
            *writer = None;
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&self) -> io::Result<()> {
        let mut stamp = chrono::Utc::now().timestamp_millis();
        let mut backup = self.backup_path(stamp);
        while backup.exists() {
            stamp += 1;
            backup = self.backup_path(stamp);
        }
        fs::rename(&self.file_path, backup)?;
        self.cleanup_old_backups()
    }

    fn backup_path(&self, stamp: i64) -> PathBuf {
        let mut backup = self.file_path.clone().into_os_string();
        backup.push(format!(".{stamp}"));
        PathBuf::from(backup)
    }

    /// Deletes rotated files beyond the retention limit, oldest first.
    ///
    /// Individual deletion failures are ignored so one stuck file cannot stop
    /// the rest of the cleanup.
    fn cleanup_old_backups(&self) -> io::Result<()> {
        let parent = match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(file_name) = self.file_path.file_name().and_then(|s| s.to_str()) else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid file name"));
        };
        let prefix = format!("{file_name}.");

        let mut backups: Vec<PathBuf> = fs::read_dir(&parent)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .is_some_and(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
            })
            .collect();

        // Suffixes are unix milliseconds; newest first.
        backups.sort_by(|a, b| b.cmp(a));

        for old_backup in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(old_backup);
        }

        Ok(())
    }
}

impl LineSink for FileWriter {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("mutex poisoned: {e}")))?;

        self.check_and_rotate(&mut writer)?;

        if writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;
            *writer = Some(file);
        }

        let file = writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no file available"))?;

        writeln!(file, "{line}")?;
        file.flush()
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .field("max_backups", &self.max_backups)
            .finish_non_exhaustive()
    }
}
