//! Shared test utilities and fixtures for mlogger integration tests.

pub use mlogger::{
    Attr, Handler, HandlerError, HandlerOptions, JsonHandler, Level, Logger, MultiHandler, Record,
    SharedHandler, TextHandler,
};

pub use mocks::{Delivery, FailingHandler, FlakyWriter, Journal, RecordingHandler, SharedBuffer};

/// Record fixtures
pub mod fixtures {
    use chrono::{TimeZone, Utc};
    use mlogger::{Attr, Level, Record};

    /// Record with a fixed timestamp so rendered output is stable
    pub fn record(level: Level, message: &str) -> Record {
        let time = Utc.with_ymd_and_hms(2024, 5, 17, 8, 0, 0).unwrap();
        Record::at(time, level, message)
    }

    /// Info record carrying a request id
    pub fn request_record(request_id: &str) -> Record {
        record(Level::Info, "request handled").with_attrs([Attr::new("request_id", request_id)])
    }
}

/// Log file helpers
pub mod files {
    use flate2::read::GzDecoder;
    use mlogger::{FileConfig, LoggerConfig};
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Temporary log directory with a default file config pointing into it
    pub struct TestLogDir {
        temp_dir: TempDir,
        log_path: PathBuf,
    }

    impl TestLogDir {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let log_path = temp_dir.path().join("app.log");
            Self {
                temp_dir,
                log_path,
            }
        }

        pub fn path(&self) -> &Path {
            self.temp_dir.path()
        }

        pub fn log_path(&self) -> &Path {
            &self.log_path
        }

        pub fn file_config(&self) -> FileConfig {
            FileConfig {
                filename: self.log_path.clone(),
                ..FileConfig::default()
            }
        }

        pub fn logger_config(&self) -> LoggerConfig {
            LoggerConfig {
                file: self.file_config(),
                ..LoggerConfig::default()
            }
        }

        /// Names of all files in the directory, sorted
        pub fn file_names(&self) -> Vec<String> {
            let mut names: Vec<String> = std::fs::read_dir(self.path())
                .expect("Failed to read log dir")
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }

    impl Default for TestLogDir {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Read a gzip-compressed backup back to text
    pub fn read_gz(path: &Path) -> String {
        let file = std::fs::File::open(path).expect("Failed to open gz file");
        let mut decoder = GzDecoder::new(file);
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .expect("Failed to decompress");
        text
    }
}
