//! JSON output for log records
//!
//! One JSON object per line, for log aggregation tools.
//!
//! Example: `{"timestamp":"2025-01-08T10:30:45.123Z","logger":"app","level":"INFO","message":"Request processed"}`

use super::formatter::Formatter;
use super::log_record::LogRecord;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    include_location: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `file`, `line` and `module_path` fields when the record carries a location
    #[must_use]
    pub fn with_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    fn to_value(&self, record: &LogRecord) -> Value {
        let mut json_obj = Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            Value::String(record.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        );
        json_obj.insert(
            "logger".to_string(),
            Value::String(record.logger_name.to_string()),
        );
        json_obj.insert(
            "level".to_string(),
            Value::String(record.level.to_str().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            Value::String(record.payload.clone()),
        );

        // Add thread info
        json_obj.insert(
            "thread_id".to_string(),
            Value::String(record.thread_id.to_string()),
        );
        if let Some(ref name) = record.thread_name {
            json_obj.insert("thread_name".to_string(), Value::String(name.to_string()));
        }

        if self.include_location {
            if let Some(loc) = record.location {
                json_obj.insert("file".to_string(), Value::String(loc.file.to_string()));
                json_obj.insert("line".to_string(), Value::Number(loc.line.into()));
                json_obj.insert(
                    "module_path".to_string(),
                    Value::String(loc.module_path.to_string()),
                );
            }
        }

        Value::Object(json_obj)
    }
}

impl Formatter for JsonFormatter {
    fn render(&self, record: &LogRecord, dest: &mut Vec<u8>) {
        // Serializing a Value built from strings and integers cannot fail
        if serde_json::to_writer(&mut *dest, &self.to_value(record)).is_ok() {
            dest.push(b'\n');
        }
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}
