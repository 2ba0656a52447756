//! File backend

use crate::core::{LogRecord, LoggerError, Result, SerializedSink, SingleThreaded, SinkBackend};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileBackend {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileBackend {
    /// Open `path` for appending, creating it if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path.into(), false)
    }

    /// Open `path` and discard whatever it held
    pub fn truncate(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path.into(), true)
    }

    fn open(path: PathBuf, truncate: bool) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation("creating log directory", parent.display().to_string(), e)
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&path).map_err(|e| {
            LoggerError::io_operation("opening log file", path.display().to_string(), e)
        })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SinkBackend for FileBackend {
    fn write(&mut self, _record: &LogRecord, formatted: &[u8]) -> Result<()> {
        self.writer.write_all(formatted)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.flush();
    }
}

pub type FileSink = SerializedSink<FileBackend>;
pub type FileSinkSt = SerializedSink<FileBackend, SingleThreaded>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, Sink};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(msg: &str) -> LogRecord {
        LogRecord::new(Arc::from("file"), LogLevel::Info, msg)
    }

    #[test]
    fn test_append_and_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        {
            let sink = FileSink::new(FileBackend::new(&path).unwrap());
            sink.set_pattern("%v");
            sink.log(&record("first")).unwrap();
        }
        {
            let sink = FileSink::new(FileBackend::new(&path).unwrap());
            sink.set_pattern("%v");
            sink.log(&record("second")).unwrap();
            sink.flush().unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        }
        {
            let sink = FileSinkSt::new(FileBackend::truncate(&path).unwrap());
            sink.set_pattern("%v");
            sink.log(&record("only")).unwrap();
            sink.with_backend(|backend| assert_eq!(backend.path(), path.as_path()));
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "only\n");
    }

    #[test]
    fn test_open_failure_names_the_path() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a log file
        let err = match FileBackend::new(dir.path()) {
            Err(err) => err,
            Ok(_) => panic!("opening a directory should fail"),
        };
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
    }
}
