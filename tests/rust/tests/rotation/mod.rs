//! Rotating file integration tests
//!
//! Tests for size rotation, backup retention by count and age, and
//! compression, driven through the JSON file handler.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use mlogger::{Handler, HandlerOptions, JsonHandler, Level, RotatingFile};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tests::files::{read_gz, TestLogDir};
use tests::fixtures;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 8, 0, 0).unwrap()
}

/// Clock that returns `base_time() + offset` seconds, with a handle to move it
fn movable_clock() -> (Arc<AtomicI64>, mlogger::rotate::Clock) {
    let offset = Arc::new(AtomicI64::new(0));
    let handle = offset.clone();
    let clock: mlogger::rotate::Clock = Box::new(move || base_time() + ChronoDuration::seconds(handle.load(Ordering::SeqCst)));
    (offset, clock)
}

#[test]
fn test_json_handler_rotates_file() {
    let dir = TestLogDir::new();
    let mut config = dir.file_config();
    config.compress = false;
    let (offset, clock) = movable_clock();
    let file = RotatingFile::new(&config)
        .with_max_size_bytes(200)
        .with_clock(clock);
    let handler = JsonHandler::new(file, HandlerOptions::default());

    for i in 0..6 {
        offset.store(i, Ordering::SeqCst);
        handler
            .handle(&fixtures::record(Level::Info, &format!("message {}", i)))
            .unwrap();
    }

    let names = dir.file_names();
    assert!(names.contains(&"app.log".to_string()));
    assert!(names.len() > 1, "expected backups, got {:?}", names);

    // Every line across all files is intact JSON and nothing was lost
    let mut messages = Vec::new();
    for name in &names {
        let content = fs::read_to_string(dir.path().join(name)).unwrap();
        for line in content.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            messages.push(value["msg"].as_str().unwrap().to_string());
        }
    }
    messages.sort();
    let expected: Vec<String> = (0..6).map(|i| format!("message {}", i)).collect();
    assert_eq!(messages, expected);
}

#[test]
fn test_compressed_backup_keeps_content() {
    let dir = TestLogDir::new();
    let (_offset, clock) = movable_clock();
    let mut file = RotatingFile::new(&dir.file_config()).with_clock(clock);

    file.write_all(b"before rotation\n").unwrap();
    file.rotate().unwrap();
    file.write_all(b"after rotation\n").unwrap();

    assert_eq!(
        dir.file_names(),
        vec!["app-2024-05-17T08-00-00.000.log.gz", "app.log"]
    );
    let backup = dir.path().join("app-2024-05-17T08-00-00.000.log.gz");
    assert_eq!(read_gz(&backup), "before rotation\n");
    assert_eq!(fs::read_to_string(dir.log_path()).unwrap(), "after rotation\n");
}

#[test]
fn test_expired_backups_are_removed() {
    let dir = TestLogDir::new();
    let mut config = dir.file_config();
    config.compress = false;
    config.max_age_days = 7;

    // Backups left by an earlier run
    fs::write(dir.path().join("app-2024-05-01T08-00-00.000.log"), "old\n").unwrap();
    fs::write(dir.path().join("app-2024-05-15T08-00-00.000.log"), "recent\n").unwrap();

    let (_offset, clock) = movable_clock();
    let mut file = RotatingFile::new(&config).with_clock(clock);
    file.write_all(b"current\n").unwrap();
    file.rotate().unwrap();

    assert_eq!(
        dir.file_names(),
        vec![
            "app-2024-05-15T08-00-00.000.log",
            "app-2024-05-17T08-00-00.000.log",
            "app.log",
        ]
    );
}

#[test]
fn test_backup_count_limit() {
    let dir = TestLogDir::new();
    let mut config = dir.file_config();
    config.compress = false;
    config.max_backups = 1;
    let (offset, clock) = movable_clock();
    let mut file = RotatingFile::new(&config).with_clock(clock);

    for i in 0..3 {
        offset.store(i, Ordering::SeqCst);
        file.write_all(format!("generation {}\n", i).as_bytes()).unwrap();
        file.rotate().unwrap();
    }

    let backups = file.backups().unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "generation 2\n");
}

#[test]
fn test_existing_file_is_appended() {
    let dir = TestLogDir::new();
    fs::write(dir.log_path(), "{\"msg\":\"from last run\"}\n").unwrap();

    let handler = JsonHandler::new(RotatingFile::new(&dir.file_config()), HandlerOptions::default());
    handler.handle(&fixtures::record(Level::Info, "new run")).unwrap();

    let content = fs::read_to_string(dir.log_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"msg\":\"new run\""));
}
