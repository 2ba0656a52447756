//! Record formatting
//!
//! Each sink owns a private [`Formatter`] instance, so changing the pattern of
//! one sink never affects another.

use super::log_record::LogRecord;
use std::fmt::Write as _;

/// Default pattern: `[2025-01-08 10:30:45.123] [app] [INFO] message`
pub const DEFAULT_PATTERN: &str = "[%Y-%m-%d %H:%M:%S.%e] [%n] [%l] %v";

/// Renders a record into bytes
pub trait Formatter: Send {
    /// Append the rendered form of `record` to `dest`
    fn render(&self, record: &LogRecord, dest: &mut Vec<u8>);

    /// Independent copy of this formatter for another sink
    fn clone_box(&self) -> Box<dyn Formatter>;
}

impl Clone for Box<dyn Formatter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
    Micros,
    LoggerName,
    Level,
    ShortLevel,
    Payload,
    ThreadId,
    SourceFile,
    SourceLine,
    ModulePath,
}

/// Formatter driven by a `%`-flag pattern
///
/// | flag | output                               |
/// |------|--------------------------------------|
/// | `%Y` `%m` `%d` | year, month, day (UTC)     |
/// | `%H` `%M` `%S` | hour, minute, second       |
/// | `%e` `%f` | milliseconds, microseconds      |
/// | `%n` | logger name                          |
/// | `%l` `%L` | level, short level              |
/// | `%v` | payload                              |
/// | `%t` | thread name or id                    |
/// | `%s` `%#` `%!` | source file, line, module  |
/// | `%%` | a literal `%`                        |
///
/// Unknown flags are copied through unchanged.
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    tokens: Vec<Token>,
    eol: &'static str,
}

impl PatternFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let tokens = Self::compile(&pattern);
        Self {
            pattern,
            tokens,
            eol: "\n",
        }
    }

    /// Use a custom line terminator instead of `\n`
    #[must_use]
    pub fn with_eol(mut self, eol: &'static str) -> Self {
        self.eol = eol;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn compile(pattern: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let token = match chars.next() {
                Some('Y') => Token::Year,
                Some('m') => Token::Month,
                Some('d') => Token::Day,
                Some('H') => Token::Hour,
                Some('M') => Token::Minute,
                Some('S') => Token::Second,
                Some('e') => Token::Millis,
                Some('f') => Token::Micros,
                Some('n') => Token::LoggerName,
                Some('l') => Token::Level,
                Some('L') => Token::ShortLevel,
                Some('v') => Token::Payload,
                Some('t') => Token::ThreadId,
                Some('s') => Token::SourceFile,
                Some('#') => Token::SourceLine,
                Some('!') => Token::ModulePath,
                Some('%') => {
                    literal.push('%');
                    continue;
                }
                Some(other) => {
                    literal.push('%');
                    literal.push(other);
                    continue;
                }
                None => {
                    literal.push('%');
                    break;
                }
            };
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token);
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        tokens
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl Formatter for PatternFormatter {
    fn render(&self, record: &LogRecord, dest: &mut Vec<u8>) {
        use chrono::{Datelike, Timelike};

        let ts = &record.timestamp;
        let mut line = String::with_capacity(64 + record.payload.len());

        for token in &self.tokens {
            // Writing into a String cannot fail
            let _ = match token {
                Token::Literal(text) => {
                    line.push_str(text);
                    Ok(())
                }
                Token::Year => write!(line, "{:04}", ts.year()),
                Token::Month => write!(line, "{:02}", ts.month()),
                Token::Day => write!(line, "{:02}", ts.day()),
                Token::Hour => write!(line, "{:02}", ts.hour()),
                Token::Minute => write!(line, "{:02}", ts.minute()),
                Token::Second => write!(line, "{:02}", ts.second()),
                Token::Millis => write!(line, "{:03}", ts.timestamp_subsec_millis() % 1000),
                Token::Micros => write!(line, "{:06}", ts.timestamp_subsec_micros() % 1_000_000),
                Token::LoggerName => {
                    line.push_str(&record.logger_name);
                    Ok(())
                }
                Token::Level => {
                    line.push_str(record.level.to_str());
                    Ok(())
                }
                Token::ShortLevel => {
                    line.push_str(record.level.short_str());
                    Ok(())
                }
                Token::Payload => {
                    line.push_str(&record.payload);
                    Ok(())
                }
                Token::ThreadId => {
                    line.push_str(record.thread_label());
                    Ok(())
                }
                Token::SourceFile => {
                    if let Some(loc) = record.location {
                        line.push_str(loc.file_name());
                    }
                    Ok(())
                }
                Token::SourceLine => match record.location {
                    Some(loc) => write!(line, "{}", loc.line),
                    None => Ok(()),
                },
                Token::ModulePath => {
                    if let Some(loc) = record.location {
                        line.push_str(loc.module_path);
                    }
                    Ok(())
                }
            };
        }

        line.push_str(self.eol);
        dest.extend_from_slice(line.as_bytes());
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use crate::core::log_record::SourceLocation;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn sample() -> LogRecord {
        LogRecord::new(Arc::from("app"), LogLevel::Warn, "disk almost full")
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
            .with_location(SourceLocation::new("src/main.rs", 17, "app::main"))
    }

    fn render(formatter: &dyn Formatter, record: &LogRecord) -> String {
        let mut buf = Vec::new();
        formatter.render(record, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_default_pattern() {
        let out = render(&PatternFormatter::default(), &sample());
        assert_eq!(out, "[2025-01-08 10:30:45.000] [app] [WARN] disk almost full\n");
    }

    #[test]
    fn test_location_and_short_level() {
        let formatter = PatternFormatter::new("%L %s:%# %! - %v").with_eol("");
        assert_eq!(
            render(&formatter, &sample()),
            "W main.rs:17 app::main - disk almost full"
        );
    }

    #[test]
    fn test_missing_location_renders_empty() {
        let record = LogRecord::new(Arc::from("app"), LogLevel::Info, "x");
        let formatter = PatternFormatter::new("[%s:%#] %v").with_eol("");
        assert_eq!(render(&formatter, &record), "[:] x");
    }

    #[test]
    fn test_escapes_and_unknown_flags() {
        let formatter = PatternFormatter::new("100%% %q %").with_eol("");
        assert_eq!(render(&formatter, &sample()), "100% %q %");
    }

    #[test]
    fn test_clone_box_is_independent() {
        let original: Box<dyn Formatter> = Box::new(PatternFormatter::new("%v"));
        let copy = original.clone();
        assert_eq!(render(copy.as_ref(), &sample()), "disk almost full\n");
    }
}
