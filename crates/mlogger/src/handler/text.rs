//! Text handler - human-readable `key=value` lines for the console

use super::{shared_writer, write_line, Handler, HandlerOptions, Scope, SharedHandler, SharedWriter};
use crate::{Attr, HandlerError, Level, Record, Value};
use chrono::SecondsFormat;
use std::io::{self, Write};
use std::sync::Arc;

/// Writes records as `time=... level=INFO msg=... key=value` lines
#[derive(Clone)]
pub struct TextHandler {
    writer: SharedWriter,
    options: HandlerOptions,
    scope: Scope,
}

impl TextHandler {
    pub fn new<W>(writer: W, options: HandlerOptions) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: shared_writer(writer),
            options,
            scope: Scope::new(),
        }
    }

    /// Text handler on standard output
    pub fn stdout(options: HandlerOptions) -> Self {
        Self::new(io::stdout(), options)
    }

    /// Text handler on standard error
    pub fn stderr(options: HandlerOptions) -> Self {
        Self::new(io::stderr(), options)
    }

    /// Render a record as a single line, including the trailing newline
    pub fn format(&self, record: &Record) -> String {
        let mut line = String::with_capacity(128);
        line.push_str("time=");
        line.push_str(&record.time().to_rfc3339_opts(SecondsFormat::Millis, true));
        line.push_str(" level=");
        line.push_str(record.level().as_str());
        line.push_str(" msg=");
        push_text(&mut line, record.message());

        for (groups, attr) in self.scope.resolve(record) {
            push_attr(&mut line, groups, attr);
        }

        line.push('\n');
        line
    }
}

impl Handler for TextHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.options.level
    }

    /// Records below this handler's level are skipped, so a fan-out parent
    /// can offer every record to every child.
    fn handle(&self, record: &Record) -> Result<(), HandlerError> {
        if !self.enabled(record.level()) {
            return Ok(());
        }
        let line = self.format(record);
        write_line(&self.writer, line.as_bytes())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> SharedHandler {
        Arc::new(Self {
            writer: self.writer.clone(),
            options: self.options,
            scope: self.scope.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> SharedHandler {
        Arc::new(Self {
            writer: self.writer.clone(),
            options: self.options,
            scope: self.scope.with_group(name),
        })
    }
}

fn push_attr(line: &mut String, groups: &[String], attr: &Attr) {
    if let Value::Group(members) = &attr.value {
        let mut prefix = groups.to_vec();
        if !attr.key.is_empty() {
            prefix.push(attr.key.clone());
        }
        for member in members {
            push_attr(line, &prefix, member);
        }
        return;
    }
    if attr.key.is_empty() {
        return;
    }

    line.push(' ');
    let key = if groups.is_empty() {
        attr.key.clone()
    } else {
        format!("{}.{}", groups.join("."), attr.key)
    };
    push_text(line, &key);
    line.push('=');
    match &attr.value {
        Value::String(s) => push_text(line, s),
        other => push_text(line, &other.to_string()),
    }
}

/// Append `s`, quoting it when it would not read back as a single token
fn push_text(line: &mut String, s: &str) {
    if needs_quoting(s) {
        line.push_str(&format!("{:?}", s));
    } else {
        line.push_str(s);
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '=' || c == '"')
}
