//! Console backend

use crate::core::{LogLevel, LogRecord, Result, SerializedSink, SingleThreaded, SinkBackend};
use colored::Colorize;
use std::io::{self, Write};

/// Which standard stream a console backend writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
    /// Error and Critical to stderr, everything else to stdout
    #[default]
    ByLevel,
}

impl ConsoleTarget {
    fn uses_stderr(self, level: LogLevel) -> bool {
        match self {
            ConsoleTarget::Stdout => false,
            ConsoleTarget::Stderr => true,
            ConsoleTarget::ByLevel => level >= LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleBackend {
    target: ConsoleTarget,
    use_colors: bool,
}

impl ConsoleBackend {
    pub fn new() -> Self {
        Self {
            target: ConsoleTarget::default(),
            use_colors: true,
        }
    }

    pub fn stdout() -> Self {
        Self::new().with_target(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new().with_target(ConsoleTarget::Stderr)
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn render(&self, level: LogLevel, formatted: &[u8]) -> Vec<u8> {
        if !self.use_colors {
            return formatted.to_vec();
        }
        let text = String::from_utf8_lossy(formatted);
        let body = text.trim_end_matches(['\r', '\n']);
        let eol = &text[body.len()..];
        format!("{}{}", body.color(level.color_code()), eol).into_bytes()
    }
}

impl Default for ConsoleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkBackend for ConsoleBackend {
    fn write(&mut self, record: &LogRecord, formatted: &[u8]) -> Result<()> {
        let output = self.render(record.level, formatted);
        if self.target.uses_stderr(record.level) {
            io::stderr().lock().write_all(&output)?;
        } else {
            io::stdout().lock().write_all(&output)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both streams since ByLevel writes to both
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

pub type ConsoleSink = SerializedSink<ConsoleBackend>;
pub type ConsoleSinkSt = SerializedSink<ConsoleBackend, SingleThreaded>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_by_level() {
        let target = ConsoleTarget::ByLevel;
        assert!(!target.uses_stderr(LogLevel::Warn));
        assert!(target.uses_stderr(LogLevel::Error));
        assert!(target.uses_stderr(LogLevel::Critical));
        assert!(!ConsoleTarget::Stdout.uses_stderr(LogLevel::Critical));
        assert!(ConsoleTarget::Stderr.uses_stderr(LogLevel::Trace));
    }

    #[test]
    fn test_plain_output_is_untouched() {
        let backend = ConsoleBackend::stdout().with_colors(false);
        assert_eq!(backend.render(LogLevel::Info, b"plain\n"), b"plain\n");
    }

    #[test]
    fn test_colored_output_keeps_line_ending() {
        colored::control::set_override(true);
        let backend = ConsoleBackend::new();
        let output = String::from_utf8(backend.render(LogLevel::Error, b"boom\n")).unwrap();
        assert!(output.contains("boom"));
        assert!(output.ends_with('\n'));
        assert!(output.contains('\u{1b}'));
    }
}
