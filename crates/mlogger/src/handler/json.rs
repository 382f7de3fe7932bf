//! JSON handler - one object per line, used for the log file

use super::{shared_writer, write_line, Handler, HandlerOptions, Scope, SharedHandler, SharedWriter};
use crate::{Attr, HandlerError, Level, Record, Value};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as JsonValue};
use std::io::Write;
use std::sync::Arc;

/// Writes records as `{"time":..,"level":..,"msg":..,...}` lines
///
/// Groups become nested objects. Durations are encoded as integer
/// nanoseconds and times as RFC 3339 strings.
#[derive(Clone)]
pub struct JsonHandler {
    writer: SharedWriter,
    options: HandlerOptions,
    scope: Scope,
}

impl JsonHandler {
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

    /// Build the JSON object for a record
    pub fn to_json(&self, record: &Record) -> JsonValue {
        let mut object = Map::new();
        object.insert(
            "time".to_string(),
            JsonValue::String(record.time().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        object.insert(
            "level".to_string(),
            JsonValue::String(record.level().as_str().to_string()),
        );
        object.insert(
            "msg".to_string(),
            JsonValue::String(record.message().to_string()),
        );

        for (groups, attr) in self.scope.resolve(record) {
            insert_attr(&mut object, groups, attr);
        }

        JsonValue::Object(object)
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>, HandlerError> {
        let mut line = serde_json::to_vec(&self.to_json(record))?;
        line.push(b'\n');
        Ok(line)
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, record: &Record) -> Result<(), HandlerError> {
        if !self.enabled(record.level()) {
            return Ok(());
        }
        let line = self.encode(record)?;
        write_line(&self.writer, &line)
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

fn insert_attr(object: &mut Map<String, JsonValue>, groups: &[String], attr: &Attr) {
    if let Value::Group(members) = &attr.value {
        let mut path = groups.to_vec();
        if !attr.key.is_empty() {
            path.push(attr.key.clone());
        }
        for member in members {
            insert_attr(object, &path, member);
        }
        return;
    }
    if attr.key.is_empty() {
        return;
    }

    insert_at(object, groups, &attr.key, to_json_value(&attr.value));
}

/// Place a leaf under `path`, never replacing a value already written
///
/// Nested objects are created only once a leaf lands in them, so empty
/// groups never show up in the output. A key that is taken (including
/// `time`, `level` and `msg`) moves the new value to `key#2`, `key#3`, ...
fn insert_at(object: &mut Map<String, JsonValue>, path: &[String], key: &str, value: JsonValue) {
    match path.split_first() {
        None => {
            let key = free_key(object, key, |_| false);
            object.insert(key, value);
        }
        Some((group, rest)) => {
            let group = free_key(object, group, JsonValue::is_object);
            let slot = object
                .entry(group)
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let JsonValue::Object(inner) = slot {
                insert_at(inner, rest, key, value);
            }
        }
    }
}

/// First of `key`, `key#2`, `key#3`, ... that is vacant or `reusable`
fn free_key(
    object: &Map<String, JsonValue>,
    key: &str,
    reusable: impl Fn(&JsonValue) -> bool,
) -> String {
    if object.get(key).map_or(true, &reusable) {
        return key.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{key}#{n}");
        if object.get(&candidate).map_or(true, &reusable) {
            return candidate;
        }
        n += 1;
    }
}

fn to_json_value(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::I64(v) => JsonValue::from(*v),
        Value::U64(v) => JsonValue::from(*v),
        Value::F64(v) => Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Duration(d) => JsonValue::from(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)),
        Value::Time(t) => JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Group(members) => {
            let mut object = Map::new();
            for member in members {
                insert_attr(&mut object, &[], member);
            }
            JsonValue::Object(object)
        }
    }
}
