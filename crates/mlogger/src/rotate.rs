//! Size-rotated log file with backup retention and gzip compression

use crate::config::FileConfig;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Timestamp format embedded in backup file names
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

const MEGABYTE: u64 = 1024 * 1024;

const COMPRESS_SUFFIX: &str = ".gz";

/// Clock used to stamp backups and to expire them
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A rotated copy of the log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub compressed: bool,
}

/// Log file that rotates itself once it grows past a size limit
///
/// The current file keeps the configured name. On rotation it is renamed to
/// `<stem>-<timestamp>.<ext>`, a fresh file takes its place, and old
/// backups are compressed and pruned by count and by age. A limit of zero
/// disables that limit.
pub struct RotatingFile {
    path: PathBuf,
    max_size: u64,
    max_backups: usize,
    max_age_days: u32,
    compress: bool,
    file: Option<File>,
    size: u64,
    clock: Clock,
}

impl RotatingFile {
    pub fn new(config: &FileConfig) -> Self {
        Self {
            path: config.filename.clone(),
            // A zero limit would rotate on every write
            max_size: config.max_size_mb.max(1) * MEGABYTE,
            max_backups: config.max_backups,
            max_age_days: config.max_age_days,
            compress: config.compress,
            file: None,
            size: 0,
            clock: Box::new(Utc::now),
        }
    }

    /// Override the size limit in bytes
    pub fn with_max_size_bytes(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Bytes written to the current file
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Rename the current file to a backup and start a new one
    pub fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        if self.path.exists() {
            let backup = self.backup_path((self.clock)());
            fs::rename(&self.path, &backup)?;
            info!("Rotated log file {:?} -> {:?}", self.path, backup);
        }

        self.open_new()?;
        self.maintain_backups();
        Ok(())
    }

    /// Existing backups, newest first
    pub fn backups(&self) -> io::Result<Vec<Backup>> {
        let dir = self.dir();
        let (prefix, ext) = self.name_parts();
        let mut backups = Vec::new();

        if !dir.exists() {
            return Ok(backups);
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let (stamp_and_ext, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                Some(rest) => (rest, true),
                None => (name, false),
            };
            let Some(stamp) = stamp_and_ext
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(ext.as_str()))
            else {
                continue;
            };
            if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                backups.push(Backup {
                    path: entry.path(),
                    timestamp: naive.and_utc(),
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// `("<stem>-", ".<ext>")` for the configured file name
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (format!("{}-", stem), ext)
    }

    fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        let (prefix, ext) = self.name_parts();
        self.dir()
            .join(format!("{}{}{}", prefix, at.format(BACKUP_TIME_FORMAT), ext))
    }

    fn open_existing_or_new(&mut self, write_len: u64) -> io::Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() + write_len <= self.max_size => {
                let file = OpenOptions::new().append(true).open(&self.path)?;
                self.size = meta.len();
                self.file = Some(file);
                Ok(())
            }
            Ok(_) => self.rotate(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.open_new(),
            Err(e) => Err(e),
        }
    }

    fn open_new(&mut self) -> io::Result<()> {
        fs::create_dir_all(self.dir())?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.file = Some(file);
        self.size = 0;
        Ok(())
    }

    /// Compress, then prune by count and age. Failures are logged and skipped
    /// so that a bad backup never blocks writing the current file.
    fn maintain_backups(&self) {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!("Failed to list log backups in {:?}: {}", self.dir(), e);
                return;
            }
        };

        let mut keep = Vec::with_capacity(backups.len());
        let mut remove = Vec::new();

        for (i, backup) in backups.into_iter().enumerate() {
            if self.max_backups > 0 && i >= self.max_backups {
                remove.push(backup);
            } else {
                keep.push(backup);
            }
        }

        if self.max_age_days > 0 {
            let cutoff = (self.clock)() - ChronoDuration::days(self.max_age_days as i64);
            let (expired, fresh): (Vec<_>, Vec<_>) =
                keep.into_iter().partition(|b| b.timestamp < cutoff);
            remove.extend(expired);
            keep = fresh;
        }

        for backup in &remove {
            if let Err(e) = fs::remove_file(&backup.path) {
                warn!("Failed to remove old log file {:?}: {}", backup.path, e);
            } else {
                debug!("Removed old log file: {:?}", backup.path);
            }
        }

        if self.compress {
            for backup in keep.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_log_file(&backup.path) {
                    warn!("Failed to compress log file {:?}: {}", backup.path, e);
                }
            }
        }
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write_len = buf.len() as u64;
        if write_len > self.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    write_len, self.max_size
                ),
            ));
        }

        if self.file.is_none() {
            self.open_existing_or_new(write_len)?;
        }
        if self.size + write_len > self.max_size {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file is not open"))?;
        let n = file.write(buf)?;
        self.size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Compress a log file using gzip and remove the original
fn compress_log_file(path: &Path) -> io::Result<()> {
    let mut gz_name = path.as_os_str().to_os_string();
    gz_name.push(COMPRESS_SUFFIX);
    let gz_path = PathBuf::from(gz_name);

    let content = fs::read(path)?;
    let file = File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&content)?;
    encoder.finish()?;

    fs::remove_file(path)?;

    info!("Compressed log file: {:?} -> {:?}", path, gz_path);
    Ok(())
}
